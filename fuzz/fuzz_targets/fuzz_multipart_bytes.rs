#![no_main]

use libfuzzer_sys::fuzz_target;
use multipart_events::{Event, Multipart};

fn run(chunks: &[&[u8]]) -> (Vec<Event>, bool) {
    let mut multipart = Multipart::new(Vec::<Event>::new(), "X-BOUNDARY").expect("boundary");
    let mut failed = false;
    for chunk in chunks {
        if multipart.feed(chunk).is_err() {
            failed = true;
            break;
        }
    }

    let mut merged: Vec<Event> = Vec::new();
    for event in multipart.into_handler() {
        match event {
            Event::Data(next) => match merged.last_mut() {
                Some(Event::Data(prev)) => {
                    let mut buf = prev.to_vec();
                    buf.extend_from_slice(&next);
                    *prev = buf.into();
                }
                _ => merged.push(Event::Data(next)),
            },
            event => merged.push(event),
        }
    }
    (merged, failed)
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // The first byte picks a split point for the rest.
    let body = &data[1..];
    let split = data[0] as usize % (body.len() + 1);
    let (first, second) = body.split_at(split);

    let whole = run(&[body]);
    let halves = run(&[first, second]);
    if !whole.1 {
        assert_eq!(whole, halves);
    }
});
