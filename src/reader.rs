//! Session driver turning cumulative snapshots into increments and sentences.

use futures::stream::Fuse;
use futures::{Stream, StreamExt};
use std::pin::Pin;

use crate::sentence::SentenceBuffer;

/// Reads one streaming session, handing out only the text that is new
/// since the previous read.
pub struct ResponseReader<S> {
    snapshots: Pin<Box<Fuse<S>>>,
    current_response: String,
    last_position: usize,
}

impl<S> ResponseReader<S>
where
    S: Stream<Item = String>,
{
    pub fn new(snapshots: S) -> Self {
        Self {
            snapshots: Box::pin(snapshots.fuse()),
            current_response: String::new(),
            last_position: 0,
        }
    }

    /// Pull the next snapshot and return the part not delivered yet.
    ///
    /// `None` means the session is over, and stays so on later calls.
    pub async fn read(&mut self) -> Option<String> {
        self.current_response = self.snapshots.next().await?;
        // Snapshots only ever grow by appending, so the cursor stays on a
        // char boundary. `get` keeps a misbehaving source from panicking.
        let new_content = self
            .current_response
            .get(self.last_position..)
            .unwrap_or_default()
            .to_string();
        self.last_position = self.current_response.len();
        Some(new_content)
    }

    /// Everything received so far.
    pub fn current_response(&self) -> &str {
        &self.current_response
    }

    /// Consume the session as a stream of complete sentences.
    ///
    /// A trailing fragment without terminal punctuation is emitted last,
    /// trimmed, once the session ends.
    pub fn into_sentences(mut self) -> impl Stream<Item = String> + Send
    where
        S: Send + 'static,
    {
        async_stream::stream! {
            let mut buffer = SentenceBuffer::new();
            while let Some(piece) = self.read().await {
                for sentence in buffer.push(&piece) {
                    tracing::debug!(sentence = %sentence, "sentence complete");
                    yield sentence;
                }
            }
            if let Some(tail) = buffer.finish() {
                yield tail;
            }
        }
    }
}
