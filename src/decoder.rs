//! Incremental decoding of a streamed chat completion.
//!
//! [`StreamDecoder`] turns protocol lines into cumulative response
//! snapshots; [`decode`] drives it over an async line source.

use futures::{Stream, StreamExt};
use std::fmt::Display;

use crate::client::ClientError;
use crate::model::ChatCompletionChunk;
use crate::sse::{is_done_marker, parse_sse_line};

/// Result of feeding one line to a [`StreamDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A non-empty delta arrived; carries the whole response so far.
    Snapshot(String),
    /// Nothing to emit: keep-alive, comment, empty delta or malformed chunk.
    Skipped,
    /// The `[DONE]` sentinel was seen.
    Done,
}

/// Accumulates the deltas of one streaming session.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    cumulative: String,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text accumulated so far.
    pub fn cumulative(&self) -> &str {
        &self.cumulative
    }

    /// Whether the sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Process one raw line.
    ///
    /// Unparsable JSON is logged and skipped; the session carries on.
    /// Once `[DONE]` was seen every further line yields [`Decoded::Done`].
    pub fn feed(&mut self, line: &str) -> Decoded {
        if self.done {
            return Decoded::Done;
        }

        let Some(data) = parse_sse_line(line.trim()) else {
            return Decoded::Skipped;
        };

        if is_done_marker(data) {
            self.done = true;
            return Decoded::Done;
        }

        let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(error = %ClientError::from(e), chunk = data, "skipping unparsable chunk");
                return Decoded::Skipped;
            }
        };

        let delta = chunk.delta();
        if delta.is_empty() {
            return Decoded::Skipped;
        }

        self.cumulative.push_str(delta);
        Decoded::Snapshot(self.cumulative.clone())
    }
}

/// Decode a line source into a lazy stream of cumulative snapshots.
///
/// The stream ends on `[DONE]`, when the source ends, or after logging the
/// first source error. Values already yielded stay valid. Dropping the
/// returned stream drops `lines`, which releases whatever it holds.
pub fn decode<S, E>(lines: S) -> impl Stream<Item = String> + Send
where
    S: Stream<Item = Result<String, E>> + Send,
    E: Display + Send,
{
    async_stream::stream! {
        let mut lines = Box::pin(lines);
        let mut decoder = StreamDecoder::new();

        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(error = %e, "stream transport failed");
                    break;
                }
            };

            match decoder.feed(&line) {
                Decoded::Snapshot(snapshot) => yield snapshot,
                Decoded::Skipped => {}
                Decoded::Done => break,
            }
        }

        tracing::debug!(chars = decoder.cumulative().chars().count(), "stream finished");
    }
}
