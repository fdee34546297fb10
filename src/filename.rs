use crate::constants;
use encoding_rs::{Encoding, UTF_8};
use std::borrow::{Borrow, Cow};
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Picks the best filename out of disposition parameters.
///
/// `filename*` (RFC 5987 `charset'language'percent-encoded`) wins when its charset
/// is known. The raw payload is used as UTF-8 if the bytes don't decode in that
/// charset. An unknown charset, or a value with no `'` separators at all, defers
/// to `filename`; without one, the `filename*` payload is still used as UTF-8. The
/// result is empty when neither parameter exists. Invalid UTF-8 is replaced
/// rather than rejected.
///
/// # Examples
///
/// ```
/// use multipart_events::extract_filename;
/// use std::collections::HashMap;
///
/// let mut params = HashMap::new();
/// params.insert(&b"filename"[..], &b"fallback.txt"[..]);
/// params.insert(&b"filename*"[..], &b"UTF-8''%E2%82%AC%20rates.txt"[..]);
///
/// assert_eq!(extract_filename(&params), "€ rates.txt");
/// ```
pub fn extract_filename<K, V, S>(params: &HashMap<K, V, S>) -> String
where
    K: Borrow<[u8]> + Hash + Eq,
    V: AsRef<[u8]>,
    S: BuildHasher,
{
    let mut fallback = None;

    if let Some(value) = params.get(constants::FILENAME_EXT) {
        let value = value.as_ref();

        match ExtendedValue::parse(value) {
            Some(ext) => match ext.decode() {
                Ok(name) => return name,
                Err(err) => {
                    debug!("falling back from filename*: {}", err);
                    fallback = Some(ext.payload);
                }
            },
            None => {
                debug!("filename* has no charset separator");
                fallback = Some(value);
            }
        }
    }

    if let Some(value) = params.get(constants::FILENAME) {
        return String::from_utf8_lossy(value.as_ref()).into_owned();
    }

    fallback
        .map(|payload| String::from_utf8_lossy(payload).into_owned())
        .unwrap_or_default()
}

/// An RFC 5987 extended parameter value: `charset'language'value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedValue<'a> {
    pub charset: &'a [u8],
    pub language: &'a [u8],
    /// Still percent-encoded.
    pub payload: &'a [u8],
}

impl<'a> ExtendedValue<'a> {
    /// Splits a value at its first two apostrophes. Returns `None` if there
    /// aren't two.
    pub fn parse(value: &'a [u8]) -> Option<ExtendedValue<'a>> {
        let first = memchr::memchr(b'\'', value)?;
        let second = first + 1 + memchr::memchr(b'\'', &value[first + 1..])?;

        Some(ExtendedValue {
            charset: &value[..first],
            language: &value[first + 1..second],
            payload: &value[second + 1..],
        })
    }

    /// Percent-decodes the payload and decodes the result in the declared
    /// charset. An empty charset means UTF-8.
    ///
    /// Fails with [`Error::UnknownCharset`](crate::Error::UnknownCharset) for a
    /// charset label nobody knows. Bytes invalid in a known charset fall back to
    /// the payload read as UTF-8.
    pub fn decode(&self) -> crate::Result<String> {
        let bytes = percent_decode(self.payload);
        let charset = if self.charset.is_empty() { &b"utf-8"[..] } else { self.charset };

        match decode_charset(&bytes, charset) {
            Ok(text) => Ok(text),
            Err(crate::Error::DecodeCharset { charset }) => {
                debug!("filename* payload isn't valid {}", charset);
                Ok(String::from_utf8_lossy(self.payload).into_owned())
            }
            Err(err) => Err(err),
        }
    }
}

/// Replaces `%XX` triplets with the byte they encode. Anything that isn't a
/// well-formed triplet passes through unchanged.
///
/// # Examples
///
/// ```
/// use multipart_events::percent_decode;
///
/// assert_eq!(&percent_decode(b"na%C3%AFve%20file")[..], "naïve file".as_bytes());
/// assert_eq!(&percent_decode(b"100%.txt")[..], b"100%.txt");
/// ```
pub fn percent_decode(input: &[u8]) -> Cow<'_, [u8]> {
    let first = match memchr::memchr(b'%', input) {
        Some(idx) => idx,
        None => return Cow::Borrowed(input),
    };

    let mut out = Vec::with_capacity(input.len());
    out.extend_from_slice(&input[..first]);

    let mut i = first;
    while i < input.len() {
        let decoded = match input.get(i..i + 3) {
            Some(&[b'%', hi, lo]) => hex_value(hi).and_then(|hi| hex_value(lo).map(|lo| (hi << 4) | lo)),
            _ => None,
        };

        match decoded {
            Some(b) => {
                out.push(b);
                i += 3;
            }
            None => {
                out.push(input[i]);
                i += 1;
            }
        }
    }

    Cow::Owned(out)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decodes `bytes` in the charset named by a WHATWG label such as `utf-8` or
/// `shift_jis` (matched case-insensitively).
///
/// ISO-8859-1 labels (`iso-8859-1`, `latin1`, ...) decode every byte to the code
/// point of the same value, so `0x80..=0x9F` stay C1 controls. WHATWG would
/// decode them as windows-1252; only `windows-1252` itself does that here.
///
/// Unlike [`extract_filename`] this is strict: an unknown label or bytes that
/// are malformed in the charset are errors.
pub fn decode_charset(bytes: &[u8], charset: &[u8]) -> crate::Result<String> {
    if is_latin1_label(charset) {
        return Ok(encoding_rs::mem::decode_latin1(bytes).into_owned());
    }

    let encoding = Encoding::for_label(charset).ok_or_else(|| crate::Error::UnknownCharset {
        charset: String::from_utf8_lossy(charset).into_owned(),
    })?;

    if encoding == UTF_8 {
        return std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| crate::Error::DecodeCharset {
                charset: encoding.name().to_owned(),
            });
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| crate::Error::DecodeCharset {
            charset: encoding.name().to_owned(),
        })
}

fn is_latin1_label(charset: &[u8]) -> bool {
    let start = charset
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(charset.len());
    let end = charset
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |idx| idx + 1);
    let label = &charset[start..end];

    constants::LATIN1_LABELS
        .iter()
        .any(|known| label.eq_ignore_ascii_case(known))
}
