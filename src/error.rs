use std::fmt::{self, Debug, Display, Formatter};

use derive_more::Display;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A set of errors that can occur while building a parser, feeding it, or
/// decoding parameter values.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// No usable boundary was supplied, either because the `Content-Type` has no
    /// `boundary` parameter or because the token is empty.
    #[display(fmt = "Missing boundary in Content-Type.")]
    MissingBoundary,

    /// The boundary token is longer than 70 bytes or contains a line break.
    #[display(fmt = "invalid multipart boundary: {:?}", boundary)]
    InvalidBoundary { boundary: String },

    /// A part header name contains a byte outside the token character set.
    #[display(fmt = "invalid part header name: {:?}", name)]
    InvalidHeaderName { name: String },

    /// A boundary delimiter was followed by something other than a line break,
    /// the closing `--`, or transport padding.
    #[display(fmt = "malformed boundary line")]
    MalformedBoundary,

    /// The parser already hit a fatal error and can't accept more data.
    #[display(fmt = "parser already failed on a previous chunk")]
    ParserFailed,

    /// The input stream ended before the closing boundary.
    #[display(fmt = "incomplete multipart stream")]
    IncompleteStream,

    /// Reading the input stream failed.
    #[display(fmt = "stream read failed: {}", _0)]
    StreamReadFailed(BoxError),

    /// The charset label isn't known.
    #[display(fmt = "unknown charset: {:?}", charset)]
    UnknownCharset { charset: String },

    /// The bytes aren't valid in the given charset.
    #[display(fmt = "failed to decode text as {}", charset)]
    DecodeCharset { charset: String },
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::StreamReadFailed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}
