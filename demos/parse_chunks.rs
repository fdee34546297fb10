use multipart_events::{parse_content_disposition, Event, Multipart};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let body = b"preamble is ignored\r\n\
--X-BOUNDARY\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\
\r\n\
Quarterly report\r\n\
--X-BOUNDARY\r\n\
Content-Disposition: form-data; name=\"report\"; filename=\"q3.csv\"\r\n\
Content-Type: text/csv\r\n\
\r\n\
region,total\r\nnorth,12\r\nsouth,7\r\n\
--X-BOUNDARY--\r\n";

    let mut multipart = Multipart::new(Vec::<Event>::new(), "X-BOUNDARY")?;

    // Feed in small, arbitrary chunks as a network read would deliver them.
    for chunk in body.chunks(11) {
        multipart.feed(chunk)?;

        for event in multipart.handler_mut().drain(..) {
            match event {
                Event::Header { name, value } if name.eq_ignore_ascii_case(b"content-disposition") => {
                    let cd = parse_content_disposition(&value);
                    println!(
                        "part {:?} (file: {:?})",
                        cd.name().map(String::from_utf8_lossy),
                        cd.filename()
                    );
                }
                Event::Data(data) => println!("  {} bytes: {:?}", data.len(), String::from_utf8_lossy(&data)),
                event => println!("{:?}", event),
            }
        }
    }

    println!("complete: {}", multipart.is_complete());

    Ok(())
}
