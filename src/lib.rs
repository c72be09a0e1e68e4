//! # chatsplit - streaming chat completions, one sentence at a time
//!
//! A small async client for OpenAI-compatible Chat Completions endpoints.
//! Besides the plain request/response call it decodes streamed responses
//! and cuts them into complete sentences as they arrive, which is what a
//! text-to-speech engine or a live UI wants to consume.
//!
//! ## Pipeline
//!
//! ```text
//! HTTP body ─► sse::lines ─► decoder::decode ─► cumulative text
//!                                                   │
//!             sentences ◄─ sentence::SentenceBuffer ◄─ reader::ResponseReader
//! ```
//!
//! - [`decoder::StreamDecoder`] parses `data: ` lines, skips malformed ones
//!   and stops at `[DONE]`.
//! - [`reader::ResponseReader`] hands out only the text that is new since
//!   the previous read.
//! - [`sentence::split_sentences`] closes a sentence at any of
//!   `. ! ? 。 ！ ？` and keeps the unterminated rest.
//!
//! ## Example
//! ```no_run
//! use chatsplit::client::StreamingClient;
//! use chatsplit::providers::OpenAiClient;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAiClient::from_env()?;
//!
//!     let sentences = client.reader("Tell me a short story.").await.into_sentences();
//!     futures::pin_mut!(sentences);
//!     while let Some(sentence) = sentences.next().await {
//!         println!("{}", sentence);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod decoder;
pub mod http;
pub mod model;
pub mod options;
pub mod providers;
pub mod reader;
pub mod sentence;
pub mod sse;

// Re-exports for convenience
pub use client::{Client, ClientError, CumulativeStream, StreamingClient};
pub use decoder::{decode, Decoded, StreamDecoder};
pub use reader::ResponseReader;
pub use sentence::{split_sentences, SentenceBuffer};
