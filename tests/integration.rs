use bytes::{Bytes, BytesMut};
use multipart_events::{extract_filename, parse_content_disposition, Error, Event, Handler, Multipart};
use std::collections::HashMap;

#[derive(Default)]
struct Part {
    headers: HashMap<Vec<u8>, Vec<u8>>,
    content: Vec<u8>,
}

#[derive(Default)]
struct Form {
    parts: Vec<Part>,
    current: Option<Part>,
    body_begin: usize,
    body_complete: usize,
    headers_complete: usize,
}

impl Handler for Form {
    fn on_body_begin(&mut self) {
        self.body_begin += 1;
    }

    fn on_part_begin(&mut self) {
        self.current = Some(Part::default());
    }

    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        let part = self.current.as_mut().unwrap();
        part.headers.insert(name.to_vec(), value.to_vec());
    }

    fn on_headers_complete(&mut self) {
        self.headers_complete += 1;
    }

    fn on_data(&mut self, data: &[u8]) {
        assert!(!data.is_empty());
        self.current.as_mut().unwrap().content.extend_from_slice(data);
    }

    fn on_part_complete(&mut self) {
        let part = self.current.take().unwrap();
        self.parts.push(part);
    }

    fn on_body_complete(&mut self) {
        self.body_complete += 1;
    }
}

fn headers(pairs: &[(&str, &[u8])]) -> HashMap<Vec<u8>, Vec<u8>> {
    pairs
        .iter()
        .map(|(name, value)| (name.as_bytes().to_vec(), value.to_vec()))
        .collect()
}

fn parse_form(chunks: &[&[u8]]) -> Form {
    let mut multipart = Multipart::new(Form::default(), "foo").unwrap();
    for chunk in chunks {
        multipart.feed(chunk).unwrap();
    }
    multipart.into_handler()
}

/// Merges adjacent data events so runs can be compared across chunkings.
fn coalesce(events: Vec<Event>) -> Vec<Event> {
    let mut merged: Vec<Event> = Vec::new();
    for event in events {
        match event {
            Event::Data(next) => match merged.last_mut() {
                Some(Event::Data(prev)) => {
                    let mut buf = BytesMut::from(&prev[..]);
                    buf.extend_from_slice(&next);
                    *prev = buf.freeze();
                }
                _ => merged.push(Event::Data(next)),
            },
            event => merged.push(event),
        }
    }
    merged
}

fn events(boundary: &str, chunks: &[&[u8]]) -> Vec<Event> {
    let mut multipart = Multipart::new(Vec::<Event>::new(), boundary).unwrap();
    for chunk in chunks {
        multipart.feed(chunk).unwrap();
    }
    coalesce(multipart.into_handler())
}

const BODY: &[u8] = b"--foo\r\n\
Content-Disposition: form-data; name=baz; filename=\"baz.png\"\r\n\
Content-Type: image/png\r\n\
\r\n\
abcdef\r\n\
--foo\r\n\
Content-Disposition: form-data; name=\"text1\"\r\n\
\r\n\
abc\r\n--foo--";

fn assert_two_parts(form: &Form) {
    assert_eq!(form.parts.len(), 2);
    assert_eq!(
        form.parts[0].headers,
        headers(&[
            ("Content-Disposition", b"form-data; name=baz; filename=\"baz.png\""),
            ("Content-Type", b"image/png"),
        ])
    );
    assert_eq!(form.parts[0].content, b"abcdef");
    assert_eq!(
        form.parts[1].headers,
        headers(&[("Content-Disposition", b"form-data; name=\"text1\"")])
    );
    assert_eq!(form.parts[1].content, b"abc");
    assert_eq!(form.body_begin, 1);
    assert_eq!(form.body_complete, 1);
    assert_eq!(form.headers_complete, 2);
}

#[test]
fn test_parse() {
    assert_two_parts(&parse_form(&[BODY]));
}

#[test]
fn test_parse_filename_star() {
    let body: &[u8] = b"--foo\r\n\
Content-Disposition: form-data; name=baz; filename=\"iso-8859-1''baz-\xe9.png\"\r\n\
Content-Type: image/png\r\n\
\r\n\
abcdef\r\n\
--foo\r\n\
Content-Disposition: form-data; name=\"text1\"\r\n\
\r\n\
abc\r\n--foo--";

    let form = parse_form(&[body]);
    assert_eq!(form.parts.len(), 2);
    assert_eq!(
        form.parts[0].headers[&b"Content-Disposition"[..]],
        b"form-data; name=baz; filename=\"iso-8859-1''baz-\xe9.png\"".to_vec()
    );
    assert_eq!(form.parts[0].content, b"abcdef");
    assert_eq!(form.body_complete, 1);
}

#[test]
fn test_parse_content_chunked() {
    let (first, second) = BODY.split_at(BODY.windows(3).position(|w| w == b"abc").unwrap() + 3);

    let mut multipart = Multipart::new(Form::default(), "foo").unwrap();
    multipart.feed(first).unwrap();
    assert_eq!(multipart.handler().headers_complete, 1);
    multipart.feed(second).unwrap();

    assert_two_parts(multipart.handler());
}

#[test]
fn test_parse_header_name_chunked() {
    let (first, second) = BODY.split_at(b"--foo\r\nContent-Disposit".len());

    let mut multipart = Multipart::new(Form::default(), "foo").unwrap();
    multipart.feed(first).unwrap();
    assert_eq!(multipart.handler().headers_complete, 0);
    multipart.feed(second).unwrap();

    assert_two_parts(multipart.handler());
}

#[test]
fn test_parse_header_value_chunked() {
    let (first, second) = BODY.split_at(b"--foo\r\nContent-Disposition: form-data; name=baz; filename=\"ba".len());

    let mut multipart = Multipart::new(Form::default(), "foo").unwrap();
    multipart.feed(first).unwrap();
    assert_eq!(multipart.handler().headers_complete, 0);
    multipart.feed(second).unwrap();

    assert_two_parts(multipart.handler());
}

#[test]
fn test_parse_boundary_chunked() {
    let split = BODY.windows(7).position(|w| w == b"\r\n--foo").unwrap() + 3;
    let (first, second) = BODY.split_at(split);
    assert!(first.ends_with(b"abcdef\r\n-"));

    let form = parse_form(&[first, second]);
    assert_two_parts(&form);
}

#[test]
fn test_parse_byte_at_a_time() {
    let chunks: Vec<&[u8]> = BODY.chunks(1).collect();
    assert_two_parts(&parse_form(&chunks));
}

#[test]
fn test_every_two_way_split_yields_same_events() {
    let whole = events("foo", &[BODY]);

    for split in 0..=BODY.len() {
        let (first, second) = BODY.split_at(split);
        assert_eq!(events("foo", &[first, second]), whole, "split at {}", split);
    }
}

#[test]
fn test_every_chunk_size_yields_same_events() {
    let body: &[u8] = b"preamble\r\n--X-BOUNDARY\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"a.bin\"\r\n\
\r\n\
\0\r\n--X-BOUNDAR\r\n-\r\r\n\r\n--X-BOUNDARX\0\r\n\
--X-BOUNDARY\r\n\
\r\n\
\r\n--X-BOUNDARY--\r\nepilogue \r\n--X-BOUNDARY\r\n";

    let whole = events("X-BOUNDARY", &[body]);
    assert_eq!(whole.first(), Some(&Event::BodyBegin));
    assert_eq!(whole.last(), Some(&Event::BodyComplete));

    for size in 1..body.len() {
        let chunks: Vec<&[u8]> = body.chunks(size).collect();
        assert_eq!(events("X-BOUNDARY", &chunks), whole, "chunk size {}", size);
    }
}

#[test]
fn test_data_resembling_boundary_passes_through() {
    let body: &[u8] = b"--foo\r\n\r\n\0\r\n--fo\r\n-foo\r\n--foo--";

    let form = parse_form(&[body]);
    assert_eq!(form.parts.len(), 1);
    assert_eq!(form.parts[0].content, b"\0\r\n--fo\r\n-foo");
    assert!(form.parts[0].headers.is_empty());
    assert_eq!(form.headers_complete, 1);
}

#[test]
fn test_parse_two_parts_with_same_name() {
    let body: &[u8] = b"--foo\r\n\
Content-Disposition: form-data; name=bar; filename=tmp.png\r\n\
Content-Type: image/png\r\n\
\r\n\
abcdef\r\n\
--foo\r\n\
Content-Disposition: form-data; name=bar; filename=foo.png\r\n\
Content-Type: image/png\r\n\
\r\n\
ghijkl\r\n\
--foo\r\n\
Content-Disposition: form-data; name=\"text1\"\r\n\
\r\n\
abc\r\n--foo--";

    let form = parse_form(&[body]);
    assert_eq!(form.parts.len(), 3);
    assert_eq!(
        form.parts[0].headers,
        headers(&[
            ("Content-Disposition", b"form-data; name=bar; filename=tmp.png"),
            ("Content-Type", b"image/png"),
        ])
    );
    assert_eq!(form.parts[0].content, b"abcdef");
    assert_eq!(
        form.parts[1].headers,
        headers(&[
            ("Content-Disposition", b"form-data; name=bar; filename=foo.png"),
            ("Content-Type", b"image/png"),
        ])
    );
    assert_eq!(form.parts[1].content, b"ghijkl");
    assert_eq!(form.parts[2].content, b"abc");
    assert_eq!(form.body_begin, 1);
    assert_eq!(form.body_complete, 1);
    assert_eq!(form.headers_complete, 3);
}

#[test]
fn test_preamble_and_epilogue_discarded() {
    let body: &[u8] = b"This is the preamble.\r\n-- foo\r\n\
--foo\r\n\r\ncontent\r\n--foo--\r\nThis is the epilogue.\r\n--foo\r\n\r\nignored\r\n--foo--";

    let events = events("foo", &[body]);
    assert_eq!(
        events,
        vec![
            Event::BodyBegin,
            Event::PartBegin,
            Event::HeadersComplete,
            Event::Data(Bytes::from_static(b"content")),
            Event::PartComplete,
            Event::BodyComplete,
        ]
    );
}

#[test]
fn test_empty_input_emits_nothing() {
    assert!(events("foo", &[]).is_empty());
    assert!(events("foo", &[&b""[..], &b""[..]]).is_empty());
}

#[test]
fn test_no_parts() {
    assert_eq!(
        events("X-BOUNDARY", &[&b"--X-BOUNDARY--\r\n"[..]]),
        vec![Event::BodyBegin, Event::BodyComplete]
    );
}

#[test]
fn test_unterminated_body_never_completes() {
    let mut multipart = Multipart::new(Vec::<Event>::new(), "foo").unwrap();
    multipart.feed(b"--foo\r\n\r\nabc\r\n--bar--").unwrap();

    assert!(!multipart.is_complete());
    assert_eq!(
        coalesce(multipart.into_handler()),
        vec![
            Event::BodyBegin,
            Event::PartBegin,
            Event::HeadersComplete,
            Event::Data(Bytes::from_static(b"abc\r\n--bar--")),
        ]
    );
}

#[test]
fn test_empty_part_content() {
    let events = events("foo", &[&b"--foo\r\nContent-Type: text/plain\r\n\r\n\r\n--foo--"[..]]);
    assert_eq!(
        events,
        vec![
            Event::BodyBegin,
            Event::PartBegin,
            Event::Header {
                name: Bytes::from_static(b"Content-Type"),
                value: Bytes::from_static(b"text/plain"),
            },
            Event::HeadersComplete,
            Event::PartComplete,
            Event::BodyComplete,
        ]
    );
}

#[test]
fn test_header_value_whitespace() {
    let events = events("foo", &[&b"--foo\r\nX-A:no-space\r\nX-B:  two-spaces \r\nX-C:\r\n\r\n\r\n--foo--"[..]]);
    let headers: Vec<(Bytes, Bytes)> = events
        .into_iter()
        .filter_map(|event| match event {
            Event::Header { name, value } => Some((name, value)),
            _ => None,
        })
        .collect();

    assert_eq!(
        headers,
        vec![
            (Bytes::from_static(b"X-A"), Bytes::from_static(b"no-space")),
            (Bytes::from_static(b"X-B"), Bytes::from_static(b" two-spaces ")),
            (Bytes::from_static(b"X-C"), Bytes::new()),
        ]
    );
}

#[test]
fn test_invalid_header_name_stops_events() {
    let mut multipart = Multipart::new(Vec::<Event>::new(), "foo").unwrap();
    let err = multipart
        .feed(b"--foo\r\nContent-Type: text/plain\r\n<bad>: x\r\n\r\nabc\r\n--foo--")
        .unwrap_err();

    assert!(matches!(err, Error::InvalidHeaderName { .. }));
    assert_eq!(multipart.feed(b"--foo--"), Err(Error::ParserFailed));
    assert_eq!(
        multipart.into_handler(),
        vec![
            Event::BodyBegin,
            Event::PartBegin,
            Event::Header {
                name: Bytes::from_static(b"Content-Type"),
                value: Bytes::from_static(b"text/plain"),
            },
        ]
    );
}

#[test]
fn test_missing_boundary() {
    let err = Multipart::with_content_type(Vec::<Event>::new(), "multipart/form-data; charset=utf-8").err();
    assert_eq!(err, Some(Error::MissingBoundary));
    assert_eq!(err.unwrap().to_string(), "Missing boundary in Content-Type.");

    assert_eq!(Multipart::new(Vec::<Event>::new(), "").err(), Some(Error::MissingBoundary));
}

#[test]
fn test_content_type_boundary_source() {
    let mut multipart =
        Multipart::with_content_type(Vec::<Event>::new(), "multipart/form-data; BOUNDARY=\"foo\"").unwrap();
    multipart.feed(BODY).unwrap();
    assert!(multipart.is_complete());
}

#[test]
fn test_disposition_from_events() {
    #[derive(Default)]
    struct Filenames(Vec<(Vec<u8>, String)>);

    impl Handler for Filenames {
        fn on_header(&mut self, name: &[u8], value: &[u8]) {
            if name.eq_ignore_ascii_case(b"content-disposition") {
                let cd = parse_content_disposition(value);
                let field = cd.name().unwrap_or_default().to_vec();
                self.0.push((field, extract_filename(cd.params())));
            }
        }
    }

    let body: &[u8] = b"--foo\r\n\
Content-Disposition: form-data; name=upload; filename*=UTF-8''%E2%82%AC.txt; filename=\"euro.txt\"\r\n\
\r\n\
1\r\n\
--foo\r\n\
content-disposition: FORM-DATA; NAME=\"legacy\"; filename=\"C:\\\\tmp\\\\a b.txt\"\r\n\
\r\n\
2\r\n\
--foo\r\n\
Content-Disposition: form-data; name=text\r\n\
\r\n\
3\r\n--foo--";

    let mut filenames = Filenames::default();
    let mut multipart = Multipart::new(&mut filenames, "foo").unwrap();
    for chunk in body.chunks(5) {
        multipart.feed(chunk).unwrap();
    }
    assert!(multipart.is_complete());

    assert_eq!(
        filenames.0,
        vec![
            (b"upload".to_vec(), "€.txt".to_owned()),
            (b"legacy".to_vec(), "C:\\tmp\\a b.txt".to_owned()),
            (b"text".to_vec(), String::new()),
        ]
    );
}
