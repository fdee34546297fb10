use multipart_events::{extract_filename, parse_content_disposition, Handler, Multipart};
use tokio::io::AsyncRead;

// Prints each field as it streams in.
#[derive(Default)]
struct Printer {
    content: Vec<u8>,
}

impl Handler for Printer {
    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        if name.eq_ignore_ascii_case(b"content-disposition") {
            let cd = parse_content_disposition(value);
            let name = cd.name().map(String::from_utf8_lossy);
            let file_name = cd.filename();

            println!("Name: {:?}, File Name: {:?}", name, file_name);
            println!("Decoded File Name: {:?}", extract_filename(cd.params()));
        }
    }

    fn on_data(&mut self, data: &[u8]) {
        self.content.extend_from_slice(data);
    }

    fn on_part_complete(&mut self) {
        println!("Content: {:?}", String::from_utf8_lossy(&self.content));
        self.content.clear();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate an `AsyncRead` and the boundary from somewhere e.g. server request body.
    let (reader, content_type) = get_async_reader_from_somewhere().await;

    // Create a `Multipart` instance from the request's `Content-Type` header.
    let mut multipart = Multipart::with_content_type(Printer::default(), content_type)?;

    // Drive the parser until the closing boundary.
    multipart.feed_reader(reader).await?;

    Ok(())
}

// Generate an `AsyncRead` and the content type from somewhere e.g. server request body.
async fn get_async_reader_from_somewhere() -> (impl AsyncRead, &'static str) {
    let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"My Field\"\r\n\r\nabcd\r\n--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"File Field\"; filename*=UTF-8''a-%C3%A9-file.txt; filename=\"a-text-file.txt\"\r\nContent-Type: text/plain\r\n\r\nHello world\nHello\r\nWorld\rAgain\r\n--X-BOUNDARY--\r\n";

    (data.as_bytes(), "multipart/form-data; boundary=X-BOUNDARY")
}
