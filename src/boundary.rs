use crate::constants;
use bytes::{BufMut, Bytes, BytesMut};
use std::convert::TryFrom;

/// Where the multipart boundary comes from.
///
/// Plain strings and byte slices convert to [`BoundarySource::Token`]. A full
/// header value such as `multipart/form-data; boundary=X-BOUNDARY` has to be
/// wrapped in [`BoundarySource::ContentType`] explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySource<'a> {
    /// The raw boundary token, without the leading `--`.
    Token(&'a [u8]),
    /// A `Content-Type` header value carrying a `boundary` parameter.
    ContentType(&'a [u8]),
}

impl<'a> From<&'a str> for BoundarySource<'a> {
    fn from(token: &'a str) -> Self {
        BoundarySource::Token(token.as_bytes())
    }
}

impl<'a> From<&'a String> for BoundarySource<'a> {
    fn from(token: &'a String) -> Self {
        BoundarySource::Token(token.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for BoundarySource<'a> {
    fn from(token: &'a [u8]) -> Self {
        BoundarySource::Token(token)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for BoundarySource<'a> {
    fn from(token: &'a [u8; N]) -> Self {
        BoundarySource::Token(&token[..])
    }
}

impl<'a> From<&'a Vec<u8>> for BoundarySource<'a> {
    fn from(token: &'a Vec<u8>) -> Self {
        BoundarySource::Token(token.as_slice())
    }
}

/// A validated multipart boundary token: 1 to 70 bytes, no line breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(Bytes);

impl Boundary {
    /// Validates a raw boundary token.
    pub fn new<T: Into<Bytes>>(token: T) -> crate::Result<Boundary> {
        let token = token.into();

        if token.is_empty() {
            return Err(crate::Error::MissingBoundary);
        }

        if token.len() > constants::MAX_BOUNDARY_LEN
            || token.iter().any(|&b| b == constants::CR || b == constants::LF)
        {
            return Err(crate::Error::InvalidBoundary {
                boundary: String::from_utf8_lossy(&token).into_owned(),
            });
        }

        Ok(Boundary(token))
    }

    /// Extracts and validates the boundary from a `Content-Type` header value.
    pub fn from_content_type<T: AsRef<[u8]>>(content_type: T) -> crate::Result<Boundary> {
        crate::parse_boundary(content_type).and_then(Boundary::new)
    }

    /// The token bytes, without the leading `--`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The byte sequence that terminates part data: `CRLF--<token>`.
    pub(crate) fn delimiter(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(constants::CRLF.len() + constants::BOUNDARY_EXT.len() + self.0.len());
        buf.put_slice(constants::CRLF);
        buf.put_slice(constants::BOUNDARY_EXT);
        buf.put_slice(&self.0);
        buf.freeze()
    }
}

impl<'a> TryFrom<BoundarySource<'a>> for Boundary {
    type Error = crate::Error;

    fn try_from(source: BoundarySource<'a>) -> crate::Result<Boundary> {
        match source {
            BoundarySource::Token(token) => Boundary::new(Bytes::copy_from_slice(token)),
            BoundarySource::ContentType(content_type) => Boundary::from_content_type(content_type),
        }
    }
}

impl AsRef<[u8]> for Boundary {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
