use crate::buffer::DelimiterMatcher;
use crate::constants;
use crate::state::ParserState;
use crate::{Boundary, BoundarySource, Handler};
use bytes::BytesMut;
use std::convert::TryFrom;

/// An incremental `multipart/form-data` body parser.
///
/// Bytes go in through [`feed`](Multipart::feed) in chunks of any size, and parse
/// events come out synchronously through the [`Handler`]. The event sequence
/// doesn't depend on how the body is split into chunks, apart from how part data
/// is sliced across [`on_data`](Handler::on_data) calls.
///
/// Only partial header lines and a withheld delimiter prefix are buffered between
/// calls; part data is never accumulated.
///
/// # Examples
///
/// ```
/// use multipart_events::{Event, Multipart};
///
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
///
/// let mut multipart = Multipart::new(Vec::<Event>::new(), "X-BOUNDARY").unwrap();
/// for chunk in data.as_bytes().chunks(7) {
///     multipart.feed(chunk).unwrap();
/// }
///
/// assert!(multipart.is_complete());
///
/// let content: Vec<u8> = multipart
///     .handler()
///     .iter()
///     .filter_map(|event| match event {
///         Event::Data(data) => Some(data.to_vec()),
///         _ => None,
///     })
///     .flatten()
///     .collect();
/// assert_eq!(content, b"abcd");
/// ```
pub struct Multipart<H> {
    handler: H,
    boundary: Boundary,
    matcher: DelimiterMatcher,
    state: ParserState,
    header_name: BytesMut,
    header_value: BytesMut,
    body_started: bool,
    in_part: bool,
    complete: bool,
}

impl<H: Handler> Multipart<H> {
    /// Constructs a parser from a raw boundary token or a
    /// [`BoundarySource::ContentType`] value.
    ///
    /// Fails with [`Error::MissingBoundary`](crate::Error::MissingBoundary) if no
    /// boundary can be found or it's empty.
    pub fn new<'a, B>(handler: H, boundary: B) -> crate::Result<Multipart<H>>
    where
        B: Into<BoundarySource<'a>>,
    {
        let boundary = Boundary::try_from(boundary.into())?;
        Ok(Multipart::with_boundary(handler, boundary))
    }

    /// Constructs a parser from a `Content-Type` header value such as
    /// `multipart/form-data; boundary=X-BOUNDARY`.
    pub fn with_content_type<T: AsRef<[u8]>>(handler: H, content_type: T) -> crate::Result<Multipart<H>> {
        Multipart::new(handler, BoundarySource::ContentType(content_type.as_ref()))
    }

    /// Constructs a parser from an already validated boundary.
    pub fn with_boundary(handler: H, boundary: Boundary) -> Multipart<H> {
        let mut matcher = DelimiterMatcher::new(boundary.delimiter());
        matcher.assume_line_start();

        Multipart {
            handler,
            boundary,
            matcher,
            state: ParserState::Preamble,
            header_name: BytesMut::new(),
            header_value: BytesMut::new(),
            body_started: false,
            in_part: false,
            complete: false,
        }
    }

    /// Processes one chunk of the body, invoking the handler for everything it
    /// completes.
    ///
    /// A part is only completed once the boundary line after it is known to be
    /// well formed, so a [`MalformedBoundary`](crate::Error::MalformedBoundary)
    /// never follows an `on_part_complete` for the same delimiter.
    ///
    /// A fatal error leaves already delivered events in place, but the parser
    /// won't emit anything further and every later call returns
    /// [`Error::ParserFailed`](crate::Error::ParserFailed).
    pub fn feed(&mut self, chunk: &[u8]) -> crate::Result<()> {
        if self.state == ParserState::Failed {
            return Err(crate::Error::ParserFailed);
        }

        if chunk.is_empty() {
            return Ok(());
        }

        if !self.body_started {
            self.body_started = true;
            self.handler.on_body_begin();
        }

        self.process(chunk).map_err(|err| {
            debug!("multipart parsing failed: {}", err);
            self.state = ParserState::Failed;
            err
        })
    }

    fn process(&mut self, chunk: &[u8]) -> crate::Result<()> {
        let mut pos = 0;

        while pos < chunk.len() {
            match self.state {
                ParserState::Preamble => match self.matcher.scan(&chunk[pos..], |_| {}) {
                    Some(n) => {
                        pos += n;
                        trace!("first boundary found");
                        self.state = ParserState::AfterBoundary;
                    }
                    None => pos = chunk.len(),
                },
                ParserState::Data => {
                    let handler = &mut self.handler;
                    match self.matcher.scan(&chunk[pos..], |data| handler.on_data(data)) {
                        Some(n) => {
                            pos += n;
                            self.state = ParserState::AfterBoundary;
                        }
                        None => pos = chunk.len(),
                    }
                }
                ParserState::AfterBoundary => {
                    self.state = match chunk[pos] {
                        constants::HYPHEN => ParserState::ClosingHyphen,
                        constants::CR => ParserState::BoundaryLf,
                        b if constants::is_lws(b) => ParserState::AfterBoundary,
                        _ => return Err(crate::Error::MalformedBoundary),
                    };
                    pos += 1;
                }
                ParserState::ClosingHyphen => {
                    if chunk[pos] != constants::HYPHEN {
                        return Err(crate::Error::MalformedBoundary);
                    }
                    pos += 1;

                    self.finish_part();
                    trace!("closing boundary found");
                    self.complete = true;
                    self.state = ParserState::Epilogue;
                    self.handler.on_body_complete();
                }
                ParserState::BoundaryLf => {
                    if chunk[pos] != constants::LF {
                        return Err(crate::Error::MalformedBoundary);
                    }
                    pos += 1;

                    self.finish_part();
                    trace!("part begins");
                    self.in_part = true;
                    self.state = ParserState::HeaderFieldStart;
                    self.handler.on_part_begin();
                }
                ParserState::HeaderFieldStart => {
                    if chunk[pos] == constants::CR {
                        pos += 1;
                        self.state = ParserState::HeadersEndLf;
                    } else {
                        self.state = ParserState::HeaderField;
                    }
                }
                ParserState::HeaderField => {
                    let rest = &chunk[pos..];
                    let (name, done) = match memchr::memchr(constants::COLON, rest) {
                        Some(idx) => (&rest[..idx], true),
                        None => (rest, false),
                    };

                    if let Some(idx) = name.iter().position(|&b| !constants::is_header_name_char(b)) {
                        return Err(self.invalid_header_name(&name[..=idx]));
                    }

                    self.header_name.extend_from_slice(name);
                    pos += name.len();

                    if done {
                        if self.header_name.is_empty() {
                            return Err(self.invalid_header_name(&[]));
                        }
                        pos += 1;
                        self.state = ParserState::HeaderValueStart;
                    }
                }
                ParserState::HeaderValueStart => {
                    if chunk[pos] == b' ' {
                        pos += 1;
                    }
                    self.state = ParserState::HeaderValue;
                }
                ParserState::HeaderValue => {
                    let rest = &chunk[pos..];
                    match memchr::memchr(constants::CR, rest) {
                        Some(idx) => {
                            self.header_value.extend_from_slice(&rest[..idx]);
                            pos += idx + 1;
                            self.state = ParserState::HeaderValueLf;
                        }
                        None => {
                            self.header_value.extend_from_slice(rest);
                            pos = chunk.len();
                        }
                    }
                }
                ParserState::HeaderValueLf => {
                    if chunk[pos] == constants::LF {
                        pos += 1;
                        self.handler.on_header(&self.header_name, &self.header_value);
                        self.header_name.clear();
                        self.header_value.clear();
                        self.state = ParserState::HeaderFieldStart;
                    } else {
                        // A lone CR belongs to the value.
                        self.header_value.extend_from_slice(&[constants::CR]);
                        self.state = ParserState::HeaderValue;
                    }
                }
                ParserState::HeadersEndLf => {
                    if chunk[pos] != constants::LF {
                        return Err(self.invalid_header_name(&[constants::CR]));
                    }
                    pos += 1;

                    self.matcher.reset();
                    self.state = ParserState::Data;
                    self.handler.on_headers_complete();
                }
                ParserState::Epilogue => pos = chunk.len(),
                ParserState::Failed => return Err(crate::Error::ParserFailed),
            }
        }

        Ok(())
    }

    fn finish_part(&mut self) {
        if self.in_part {
            trace!("part complete");
            self.in_part = false;
            self.handler.on_part_complete();
        }
    }

    fn invalid_header_name(&self, tail: &[u8]) -> crate::Error {
        let mut name = self.header_name.to_vec();
        name.extend_from_slice(tail);

        crate::Error::InvalidHeaderName {
            name: String::from_utf8_lossy(&name).into_owned(),
        }
    }

    /// Whether the closing boundary has been seen.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}
