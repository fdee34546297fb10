use crate::constants;
use std::collections::HashMap;

/// Parameters keyed by lowercased name.
pub type Params = HashMap<Vec<u8>, Vec<u8>>;

/// A parsed `Content-Disposition` style header value.
///
/// See [`parse_content_disposition`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDisposition {
    disposition_type: Option<Vec<u8>>,
    params: Params,
}

impl ContentDisposition {
    /// The lowercased disposition type, e.g. `form-data` or `attachment`.
    pub fn disposition_type(&self) -> Option<&[u8]> {
        self.disposition_type.as_deref()
    }

    /// Looks up a parameter, ignoring the case of `name`.
    pub fn param<N: AsRef<[u8]>>(&self, name: N) -> Option<&[u8]> {
        self.params
            .get(&name.as_ref().to_ascii_lowercase())
            .map(|value| value.as_slice())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The `name` parameter, as sent by `multipart/form-data` clients.
    pub fn name(&self) -> Option<&[u8]> {
        self.param("name")
    }

    /// The best filename, see [`extract_filename`](crate::extract_filename).
    ///
    /// Returns `None` when neither `filename*` nor `filename` is present.
    pub fn filename(&self) -> Option<String> {
        if self.params.contains_key(constants::FILENAME_EXT) || self.params.contains_key(constants::FILENAME) {
            Some(crate::extract_filename(&self.params))
        } else {
            None
        }
    }

    pub fn into_parts(self) -> (Option<Vec<u8>>, Params) {
        (self.disposition_type, self.params)
    }

    /// Renders the value back as `type; key="value"` with parameters sorted by
    /// name, escaping `"` and `\` inside values.
    pub fn to_header_value(&self) -> Vec<u8> {
        let mut out = self.disposition_type.clone().unwrap_or_default();

        let mut params: Vec<_> = self.params.iter().collect();
        params.sort();

        for (key, value) in params {
            out.extend_from_slice(b"; ");
            out.extend_from_slice(key);
            out.extend_from_slice(b"=\"");
            for &b in value.iter() {
                if b == b'"' || b == b'\\' {
                    out.push(b'\\');
                }
                out.push(b);
            }
            out.push(b'"');
        }

        out
    }
}

/// Parses a `Content-Disposition` style header value into its disposition type
/// and parameters.
///
/// The grammar is a lenient superset of RFC 6266 that accepts what real clients
/// send: unquoted values keep their inner spaces, stray semicolons are skipped,
/// and a backslash inside quotes takes the following byte literally. Parameter
/// names and the type are lowercased, later duplicates overwrite earlier ones,
/// and percent escapes are left untouched. Nothing here ever fails; fragments that
/// don't parse are dropped.
///
/// # Examples
///
/// ```
/// use multipart_events::parse_content_disposition;
///
/// let cd = parse_content_disposition(br#"form-data; name="avatar"; filename=me.png"#);
/// assert_eq!(cd.disposition_type(), Some(&b"form-data"[..]));
/// assert_eq!(cd.name(), Some(&b"avatar"[..]));
/// assert_eq!(cd.param("FILENAME"), Some(&b"me.png"[..]));
/// ```
pub fn parse_content_disposition<T: AsRef<[u8]>>(value: T) -> ContentDisposition {
    let mut cursor = Cursor::new(value.as_ref());
    let mut cd = ContentDisposition::default();

    cursor.skip_lws();
    if cursor.is_eof() {
        return cd;
    }

    if !cursor.segment_has_equals() {
        let disposition_type = if cursor.peek() == Some(b'"') {
            let quoted = cursor.read_quoted();
            cursor.skip_segment();
            quoted
        } else {
            trim_lws(cursor.read_segment()).to_vec()
        };

        if !disposition_type.is_empty() {
            cd.disposition_type = Some(disposition_type.to_ascii_lowercase());
        }
    }

    while !cursor.is_eof() {
        cursor.skip_separators();
        if cursor.is_eof() {
            break;
        }

        let name = trim_lws(cursor.read_until(|b| b == b'=' || b == b';')).to_ascii_lowercase();

        if cursor.peek() != Some(b'=') {
            // `name` without a value.
            continue;
        }
        cursor.bump();
        cursor.skip_lws();

        let value = if cursor.peek() == Some(b'"') {
            let quoted = cursor.read_quoted();
            cursor.skip_segment();
            quoted
        } else {
            trim_lws(cursor.read_segment()).to_vec()
        };

        if !name.is_empty() {
            cd.params.insert(name, value);
        }
    }

    cd
}

fn trim_lws(mut bytes: &[u8]) -> &[u8] {
    while let Some((&first, rest)) = bytes.split_first() {
        if !constants::is_lws(first) {
            break;
        }
        bytes = rest;
    }
    while let Some((&last, rest)) = bytes.split_last() {
        if !constants::is_lws(last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Cursor { input, pos: 0 }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_lws(&mut self) {
        while matches!(self.peek(), Some(b) if constants::is_lws(b)) {
            self.bump();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(b) if b == b';' || constants::is_lws(b)) {
            self.bump();
        }
    }

    fn read_until<P: Fn(u8) -> bool>(&mut self, stop: P) -> &'a [u8] {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if !stop(b)) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    /// Reads up to the next top-level `;`, which is left in place.
    fn read_segment(&mut self) -> &'a [u8] {
        self.read_until(|b| b == b';')
    }

    /// Discards whatever is left of the current segment.
    fn skip_segment(&mut self) {
        self.read_segment();
    }

    /// Whether the current segment holds an `=` before its `;`.
    fn segment_has_equals(&self) -> bool {
        self.input[self.pos..]
            .iter()
            .take_while(|&&b| b != b';')
            .any(|&b| b == b'=')
    }

    /// Reads a quoted string starting at the opening quote and returns its
    /// unescaped content. An unterminated string runs to the end of input.
    fn read_quoted(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        self.bump();

        while let Some(b) = self.peek() {
            self.bump();
            match b {
                b'"' => break,
                b'\\' => {
                    if let Some(escaped) = self.peek() {
                        self.bump();
                        out.push(escaped);
                    }
                }
                _ => out.push(b),
            }
        }

        out
    }
}
