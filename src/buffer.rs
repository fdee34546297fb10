use crate::constants;
use bytes::Bytes;
use memchr::memmem::Finder;

/// Incremental search for the part delimiter `CRLF--<token>` across chunks.
///
/// Bytes that could still turn into a delimiter are withheld rather than
/// emitted. Since the token never contains CR, a withheld tail is always a
/// prefix of the delimiter itself, so only its length needs to be kept.
pub(crate) struct DelimiterMatcher {
    finder: Finder<'static>,
    matched: usize,
}

impl DelimiterMatcher {
    pub fn new(delimiter: Bytes) -> Self {
        DelimiterMatcher {
            finder: Finder::new(&delimiter[..]).into_owned(),
            matched: 0,
        }
    }

    /// Treats the next byte as the start of a line, so a leading `--<token>`
    /// matches without the CRLF before it.
    pub fn assume_line_start(&mut self) {
        self.matched = constants::CRLF.len();
    }

    pub fn reset(&mut self) {
        self.matched = 0;
    }

    /// Length of the withheld delimiter prefix.
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.matched
    }

    fn delimiter(&self) -> &[u8] {
        self.finder.needle()
    }

    /// Scans `input`, passing confirmed data to `emit`.
    ///
    /// Returns the number of bytes of `input` consumed up to and including the end
    /// of a complete delimiter, or `None` if `input` ran out first. In that case
    /// every byte has been either emitted or withheld.
    pub fn scan<F>(&mut self, input: &[u8], mut emit: F) -> Option<usize>
    where
        F: FnMut(&[u8]),
    {
        let delim_len = self.delimiter().len();
        let mut pos = 0;

        if self.matched > 0 {
            while pos < input.len() && input[pos] == self.delimiter()[self.matched] {
                self.matched += 1;
                pos += 1;

                if self.matched == delim_len {
                    self.matched = 0;
                    return Some(pos);
                }
            }

            if pos == input.len() {
                return None;
            }

            // False positive: the withheld bytes were data after all.
            emit(&self.delimiter()[..self.matched]);
            self.matched = 0;
        }

        let rest = &input[pos..];

        if let Some(idx) = self.finder.find(rest) {
            if idx > 0 {
                emit(&rest[..idx]);
            }
            return Some(pos + idx + delim_len);
        }

        // Only the last CR in the tail window can start a partial delimiter.
        let window = rest.len().saturating_sub(delim_len - 1);
        let tail = memchr::memrchr(constants::CR, &rest[window..])
            .map(|rel_idx| window + rel_idx)
            .filter(|&idx| self.delimiter().starts_with(&rest[idx..]));

        match tail {
            Some(idx) => {
                if idx > 0 {
                    emit(&rest[..idx]);
                }
                self.matched = rest.len() - idx;
            }
            None => {
                if !rest.is_empty() {
                    emit(rest);
                }
            }
        }

        None
    }
}
