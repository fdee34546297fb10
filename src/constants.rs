pub(crate) const MAX_BOUNDARY_LEN: usize = 70;

pub(crate) const BOUNDARY_EXT: &[u8] = b"--";
pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const CRLF: &[u8] = b"\r\n";
pub(crate) const HYPHEN: u8 = b'-';
pub(crate) const COLON: u8 = b':';

pub(crate) const FILENAME: &[u8] = b"filename";
pub(crate) const FILENAME_EXT: &[u8] = b"filename*";
pub(crate) const BOUNDARY_PARAM: &[u8] = b"boundary";

/// Charset labels that mean ISO-8859-1 proper.
pub(crate) const LATIN1_LABELS: &[&[u8]] = &[
    b"iso-8859-1",
    b"iso8859-1",
    b"iso88591",
    b"iso_8859-1",
    b"iso_8859-1:1987",
    b"iso-ir-100",
    b"latin1",
    b"l1",
    b"csisolatin1",
    b"cp819",
    b"ibm819",
];

/// Whether `b` may appear in a header field name (RFC 7230 `tchar`).
#[inline]
pub(crate) fn is_header_name_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
    ) || b.is_ascii_alphanumeric()
}

/// Linear whitespace allowed around parameter separators and after a boundary.
#[inline]
pub(crate) fn is_lws(b: u8) -> bool {
    b == b' ' || b == b'\t'
}
