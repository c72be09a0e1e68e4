//! Server-Sent Events (SSE) line framing.
//!
//! Chat-completion streams arrive as newline-delimited pseudo-SSE:
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//!
//! data: {"choices":[{"delta":{"content":"lo."}}]}
//!
//! data: [DONE]
//! ```
//!
//! This module only cuts the raw body into lines. Interpreting the
//! `data: ` payloads is the job of [`crate::decoder`].

use bytes::BytesMut;
use futures::stream::{self, Stream, StreamExt};

/// Extension trait for `reqwest::Response` to read the body line by line.
///
/// # Example
/// ```ignore
/// use chatsplit::sse::SSEResponseExt;
///
/// let response = client.post(url).send().await?;
/// let mut lines = Box::pin(response.sse_lines());
/// while let Some(line) = lines.next().await {
///     println!("line: {}", line?);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response body into a stream of text lines.
    ///
    /// Ends when the body ends or after the first transport error.
    fn sse_lines(self) -> impl Stream<Item = Result<String, reqwest::Error>> + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn sse_lines(self) -> impl Stream<Item = Result<String, reqwest::Error>> + Send {
        lines(self.bytes_stream())
    }
}

/// Split a chunked byte stream into lines.
///
/// Bytes are buffered until a `\n` arrives, so a multi-byte character cut in
/// half by the network is decoded only once it is whole. The trailing `\r` of
/// CRLF endings is left for the caller's trim. A last line with no newline is
/// flushed when the byte stream ends. An `Err` item is forwarded and ends the
/// line stream.
pub fn lines<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, E>> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Send,
{
    stream::unfold(
        (Box::pin(bytes), BytesMut::new(), 0usize, false),
        |(mut bytes, mut buffer, mut scanned, mut finished)| async move {
            loop {
                // Bytes before `scanned` are known to hold no newline.
                if let Some(offset) = buffer[scanned..].iter().position(|&b| b == b'\n') {
                    let pos = scanned + offset;
                    let line = buffer.split_to(pos + 1);
                    let line = String::from_utf8_lossy(&line[..pos]).into_owned();
                    return Some((Ok(line), (bytes, buffer, 0, finished)));
                }
                scanned = buffer.len();

                if finished {
                    if buffer.is_empty() {
                        return None;
                    }
                    let line = String::from_utf8_lossy(&buffer).into_owned();
                    buffer.clear();
                    return Some((Ok(line), (bytes, buffer, 0, finished)));
                }

                match bytes.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                    Some(Err(e)) => {
                        // Nothing after a transport failure is trustworthy.
                        buffer.clear();
                        return Some((Err(e), (bytes, buffer, 0, true)));
                    }
                    None => finished = true,
                }
            }
        },
    )
}

/// Parse an SSE line to extract the data portion.
///
/// The line is expected to be trimmed already. The payload after the
/// `data: ` prefix is trimmed as well.
///
/// # Example
/// ```
/// use chatsplit::sse::parse_sse_line;
///
/// assert_eq!(parse_sse_line("data: {\"key\": \"value\"}"), Some("{\"key\": \"value\"}"));
/// assert_eq!(parse_sse_line(": keep-alive"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix("data: ").map(|s| s.trim())
}

/// Check if an SSE data payload is the end-of-stream sentinel.
///
/// # Example
/// ```
/// use chatsplit::sse::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(!is_done_marker("{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &str) -> bool {
    data == "[DONE]"
}
