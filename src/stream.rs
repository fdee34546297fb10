use crate::{Handler, Multipart};
use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
#[cfg(feature = "tokio-io")]
use tokio::io::AsyncRead;
#[cfg(feature = "tokio-io")]
use tokio_util::io::ReaderStream;

impl<H: Handler> Multipart<H> {
    /// Feeds every chunk of a [`Stream`] of [`Bytes`] through
    /// [`feed`](Multipart::feed).
    ///
    /// Stops pulling from the stream once the closing boundary is seen. Fails with
    /// [`Error::IncompleteStream`](crate::Error::IncompleteStream) if the stream
    /// ends before that.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use futures_util::stream::once;
    /// use multipart_events::{Event, Multipart};
    /// use std::convert::Infallible;
    ///
    /// # async fn run() {
    /// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
    /// let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });
    ///
    /// let mut multipart = Multipart::new(Vec::<Event>::new(), "X-BOUNDARY").unwrap();
    /// multipart.feed_stream(stream).await.unwrap();
    ///
    /// assert!(multipart.handler().contains(&Event::Data(Bytes::from_static(b"abcd"))));
    /// # }
    /// # tokio::runtime::Runtime::new().unwrap().block_on(run());
    /// ```
    pub async fn feed_stream<S, O, E>(&mut self, stream: S) -> crate::Result<()>
    where
        S: Stream<Item = Result<O, E>>,
        O: Into<Bytes>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        futures_util::pin_mut!(stream);

        while let Some(chunk) = stream.next().await {
            let chunk: Bytes = chunk.map_err(|err| crate::Error::StreamReadFailed(err.into()))?.into();
            self.feed(&chunk)?;

            if self.is_complete() {
                return Ok(());
            }
        }

        if self.is_complete() {
            Ok(())
        } else {
            debug!("stream ended before the closing boundary");
            Err(crate::Error::IncompleteStream)
        }
    }

    /// Feeds everything read from an [`AsyncRead`] through
    /// [`feed`](Multipart::feed).
    ///
    /// # Optional
    ///
    /// This requires the optional `tokio-io` feature to be enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use multipart_events::{Event, Multipart};
    ///
    /// # async fn run() {
    /// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
    /// let reader = data.as_bytes();
    ///
    /// let mut multipart = Multipart::new(Vec::<Event>::new(), "X-BOUNDARY").unwrap();
    /// multipart.feed_reader(reader).await.unwrap();
    /// assert!(multipart.is_complete());
    /// # }
    /// # tokio::runtime::Runtime::new().unwrap().block_on(run());
    /// ```
    #[cfg(feature = "tokio-io")]
    pub async fn feed_reader<R>(&mut self, reader: R) -> crate::Result<()>
    where
        R: AsyncRead,
    {
        self.feed_stream(ReaderStream::new(reader)).await
    }
}
