#![no_main]

use libfuzzer_sys::fuzz_target;
use multipart_events::{extract_filename, parse_content_disposition};

fuzz_target!(|data: &[u8]| {
    let cd = parse_content_disposition(data);
    for name in cd.params().keys() {
        assert!(!name.is_empty());
        assert!(!name.iter().any(u8::is_ascii_uppercase));
    }

    let _ = extract_filename(cd.params());
    let _ = parse_content_disposition(cd.to_header_value());
});
