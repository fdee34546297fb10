//! A streaming, event-driven parser for `multipart/form-data` request bodies,
//! plus the `Content-Disposition` grammar used to label each part.
//!
//! [`Multipart`] consumes a body in chunks of any size, down to a single byte,
//! and reports boundaries, headers and data through a [`Handler`] as soon as
//! they're recognized. Header values are delivered raw; hand a
//! `Content-Disposition` value to [`parse_content_disposition`] for structured
//! parameters, and those parameters to [`extract_filename`] for a decoded
//! filename.
//!
//! # Examples
//!
//! ```
//! use multipart_events::{extract_filename, parse_content_disposition, Handler, Multipart};
//!
//! #[derive(Default)]
//! struct Upload {
//!     filenames: Vec<String>,
//!     content: Vec<u8>,
//! }
//!
//! impl Handler for Upload {
//!     fn on_header(&mut self, name: &[u8], value: &[u8]) {
//!         if name.eq_ignore_ascii_case(b"content-disposition") {
//!             let cd = parse_content_disposition(value);
//!             self.filenames.push(extract_filename(cd.params()));
//!         }
//!     }
//!
//!     fn on_data(&mut self, data: &[u8]) {
//!         self.content.extend_from_slice(data);
//!     }
//! }
//!
//! # fn run() -> multipart_events::Result<()> {
//! let body = b"--X-BOUNDARY\r\n\
//!     Content-Disposition: form-data; name=\"doc\"; filename*=UTF-8''r%C3%A9sum%C3%A9.txt\r\n\
//!     \r\n\
//!     hello\r\n\
//!     --X-BOUNDARY--\r\n";
//!
//! let mut multipart = Multipart::with_content_type(Upload::default(), "multipart/form-data; boundary=X-BOUNDARY")?;
//! for byte in body.chunks(1) {
//!     multipart.feed(byte)?;
//! }
//!
//! let upload = multipart.into_handler();
//! assert_eq!(upload.filenames, vec!["résumé.txt".to_owned()]);
//! assert_eq!(upload.content, b"hello");
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! # Features
//!
//! - `log`: emit `log` records for parser state changes and fallbacks.
//! - `tokio-io`: [`Multipart::feed_reader`] for [`tokio::io::AsyncRead`] sources.

#[cfg(feature = "log")]
macro_rules! trace {
    ($($arg:tt)+) => (log::trace!($($arg)+))
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($arg:tt)+) => {
        if false {
            let _ = format_args!($($arg)+);
        }
    };
}

#[cfg(feature = "log")]
macro_rules! debug {
    ($($arg:tt)+) => (log::debug!($($arg)+))
}

#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($($arg:tt)+) => {
        if false {
            let _ = format_args!($($arg)+);
        }
    };
}

pub use boundary::{Boundary, BoundarySource};
pub use bytes;
pub use content_disposition::{parse_content_disposition, ContentDisposition, Params};
pub use error::Error;
pub use filename::{decode_charset, extract_filename, percent_decode, ExtendedValue};
pub use handler::{Event, Handler};
pub use multipart::Multipart;

mod boundary;
mod buffer;
mod constants;
mod content_disposition;
mod error;
mod filename;
mod handler;
mod multipart;
mod state;
mod stream;

/// A Result type often returned from methods that can have `multipart-events`
/// errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Extracts the `boundary` parameter from a `Content-Type` header value.
///
/// The parameter name is matched case-insensitively and the value may be quoted.
/// Fails with [`Error::MissingBoundary`] if the parameter is absent or empty.
pub fn parse_boundary<T: AsRef<[u8]>>(content_type: T) -> crate::Result<bytes::Bytes> {
    let (_, mut params) = parse_content_disposition(content_type).into_parts();

    params
        .remove(constants::BOUNDARY_PARAM)
        .filter(|boundary| !boundary.is_empty())
        .map(bytes::Bytes::from)
        .ok_or(Error::MissingBoundary)
}
