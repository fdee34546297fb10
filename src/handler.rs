use bytes::Bytes;

/// Receives parse events from [`Multipart::feed`](crate::Multipart::feed).
///
/// For every body the events arrive in this order: `on_body_begin` once, then
/// for each part `on_part_begin`, zero or more `on_header`,
/// `on_headers_complete`, zero or more `on_data` and `on_part_complete`, and
/// finally `on_body_complete` once the closing boundary is seen.
///
/// Every method has an empty default, so implementors only override what they
/// need.
///
/// # Examples
///
/// ```
/// use multipart_events::{Handler, Multipart};
///
/// #[derive(Default)]
/// struct Sizes(Vec<usize>);
///
/// impl Handler for Sizes {
///     fn on_part_begin(&mut self) {
///         self.0.push(0);
///     }
///
///     fn on_data(&mut self, data: &[u8]) {
///         if let Some(size) = self.0.last_mut() {
///             *size += data.len();
///         }
///     }
/// }
///
/// let mut multipart = Multipart::new(Sizes::default(), "X-BOUNDARY").unwrap();
/// multipart.feed(b"--X-BOUNDARY\r\n\r\nabcd\r\n--X-BOUNDARY\r\n\r\nef\r\n--X-BOUNDARY--").unwrap();
/// assert_eq!(multipart.handler().0, vec![4, 2]);
/// ```
pub trait Handler {
    fn on_body_begin(&mut self) {}

    fn on_part_begin(&mut self) {}

    /// A raw header line of the current part, split at the first colon.
    fn on_header(&mut self, _name: &[u8], _value: &[u8]) {}

    fn on_headers_complete(&mut self) {}

    /// A non-empty slice of the current part's body.
    fn on_data(&mut self, _data: &[u8]) {}

    fn on_part_complete(&mut self) {}

    fn on_body_complete(&mut self) {}
}

impl<H: Handler + ?Sized> Handler for &mut H {
    fn on_body_begin(&mut self) {
        (**self).on_body_begin()
    }

    fn on_part_begin(&mut self) {
        (**self).on_part_begin()
    }

    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        (**self).on_header(name, value)
    }

    fn on_headers_complete(&mut self) {
        (**self).on_headers_complete()
    }

    fn on_data(&mut self, data: &[u8]) {
        (**self).on_data(data)
    }

    fn on_part_complete(&mut self) {
        (**self).on_part_complete()
    }

    fn on_body_complete(&mut self) {
        (**self).on_body_complete()
    }
}

/// An owned parse event, for callers that prefer draining a queue over
/// implementing [`Handler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BodyBegin,
    PartBegin,
    Header { name: Bytes, value: Bytes },
    HeadersComplete,
    Data(Bytes),
    PartComplete,
    BodyComplete,
}

/// Collects every event in arrival order.
impl Handler for Vec<Event> {
    fn on_body_begin(&mut self) {
        self.push(Event::BodyBegin);
    }

    fn on_part_begin(&mut self) {
        self.push(Event::PartBegin);
    }

    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        self.push(Event::Header {
            name: Bytes::copy_from_slice(name),
            value: Bytes::copy_from_slice(value),
        });
    }

    fn on_headers_complete(&mut self) {
        self.push(Event::HeadersComplete);
    }

    fn on_data(&mut self, data: &[u8]) {
        self.push(Event::Data(Bytes::copy_from_slice(data)));
    }

    fn on_part_complete(&mut self) {
        self.push(Event::PartComplete);
    }

    fn on_body_complete(&mut self) {
        self.push(Event::BodyComplete);
    }
}
