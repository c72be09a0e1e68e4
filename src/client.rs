//! Core client traits and error types.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::options::{HttpTransport, ModelOptions, TransportOptions};
use crate::reader::ResponseReader;

/// Prefix of [`Client::ask`] output when the server rejected the request.
pub const REQUEST_FAILED: &str = "Request failed";

/// Prefix of [`Client::ask`] output when the request never got a usable answer.
pub const REQUEST_ERRORED: &str = "Request errored";

/// Lazy sequence of cumulative response snapshots.
///
/// Each item is the full text received so far. Dropping the stream releases
/// the underlying connection.
pub type CumulativeStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("malformed chunk: {0}")]
    MalformedChunk(#[from] serde_json::Error),

    #[error("unexpected response structure: {0}")]
    Structure(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Single-shot chat completion.
///
/// Implementors provide the static `request`; the instance methods are
/// conveniences over the stored options.
#[async_trait]
pub trait Client: Send + Sync + Sized {
    /// Send `prompt` as one user message and return the answer text.
    async fn request(
        prompt: &str,
        model_options: &ModelOptions,
        transport_options: &TransportOptions<HttpTransport>,
    ) -> Result<String, ClientError>;

    /// Get reference to the model options field.
    fn model_options(&self) -> &ModelOptions;

    /// Get reference to the transport options field.
    fn transport_options(&self) -> &TransportOptions<HttpTransport>;

    /// `request` with the client's stored options.
    async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        Self::request(prompt, self.model_options(), self.transport_options()).await
    }

    /// `request` with overridden model options for this call only.
    async fn complete_with_options(
        &self,
        prompt: &str,
        model_options: &ModelOptions,
    ) -> Result<String, ClientError> {
        Self::request(prompt, model_options, self.transport_options()).await
    }

    /// Like [`Client::complete`] but never fails: errors come back as text
    /// prefixed with [`REQUEST_FAILED`] (server rejected the call) or
    /// [`REQUEST_ERRORED`] (anything else).
    async fn ask(&self, prompt: &str) -> String {
        match self.complete(prompt).await {
            Ok(answer) => answer,
            Err(ClientError::Server { status, message }) => {
                tracing::error!(status, message = %message, "request failed");
                format!("{}: {}", REQUEST_FAILED, message)
            }
            Err(e) => {
                tracing::error!(error = %e, "request errored");
                format!("{}: {}", REQUEST_ERRORED, e)
            }
        }
    }
}

/// Streaming chat completion.
#[async_trait]
pub trait StreamingClient: Client {
    /// Perform the streaming handshake.
    ///
    /// A non-success status is returned as [`ClientError::Server`] and no
    /// stream is produced. Failures after the handshake are logged by the
    /// stream itself, which then simply ends.
    async fn request_stream(
        prompt: &str,
        model_options: &ModelOptions,
        transport_options: &TransportOptions<HttpTransport>,
    ) -> Result<CumulativeStream, ClientError>;

    /// `request_stream` with the client's stored options.
    async fn open_stream(&self, prompt: &str) -> Result<CumulativeStream, ClientError> {
        Self::request_stream(prompt, self.model_options(), self.transport_options()).await
    }

    /// Infallible variant of [`StreamingClient::open_stream`]: a failed
    /// handshake is logged and yields an empty stream.
    async fn stream(&self, prompt: &str) -> CumulativeStream {
        match self.open_stream(prompt).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "streaming request failed");
                Box::pin(futures::stream::empty())
            }
        }
    }

    /// Wrap [`StreamingClient::stream`] in a [`ResponseReader`].
    async fn reader(&self, prompt: &str) -> ResponseReader<CumulativeStream> {
        ResponseReader::new(self.stream(prompt).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    /// Canned client used to exercise the provided methods.
    struct Canned {
        model_options: ModelOptions,
        transport_options: TransportOptions<HttpTransport>,
    }

    impl Canned {
        fn new() -> Self {
            Self {
                model_options: ModelOptions::default(),
                transport_options: TransportOptions::new(HttpTransport::default()),
            }
        }
    }

    #[async_trait]
    impl Client for Canned {
        async fn request(
            prompt: &str,
            model_options: &ModelOptions,
            _transport_options: &TransportOptions<HttpTransport>,
        ) -> Result<String, ClientError> {
            match prompt {
                "reject" => Err(ClientError::Server {
                    status: 401,
                    message: "Invalid API key".to_string(),
                }),
                "garble" => Err(ClientError::Structure("no choices".to_string())),
                _ => Ok(format!("{} says {}", model_options.model, prompt)),
            }
        }

        fn model_options(&self) -> &ModelOptions {
            &self.model_options
        }

        fn transport_options(&self) -> &TransportOptions<HttpTransport> {
            &self.transport_options
        }
    }

    #[async_trait]
    impl StreamingClient for Canned {
        async fn request_stream(
            prompt: &str,
            _model_options: &ModelOptions,
            _transport_options: &TransportOptions<HttpTransport>,
        ) -> Result<CumulativeStream, ClientError> {
            if prompt == "reject" {
                return Err(ClientError::Server {
                    status: 500,
                    message: "overloaded".to_string(),
                });
            }
            let snapshots = vec!["Hi.".to_string(), "Hi. Bye.".to_string()];
            Ok(Box::pin(futures::stream::iter(snapshots)))
        }
    }

    #[tokio::test]
    async fn test_ask_passes_answer_through() {
        assert_eq!(Canned::new().ask("hello").await, "gpt-4o says hello");
    }

    #[tokio::test]
    async fn test_complete_with_options_overrides_model() {
        let options = ModelOptions::default().with_model("small".to_string());
        let answer = Canned::new().complete_with_options("hi", &options).await.unwrap();
        assert_eq!(answer, "small says hi");
    }

    #[tokio::test]
    async fn test_ask_distinguishes_failed_from_errored() {
        let client = Canned::new();
        assert_eq!(client.ask("reject").await, "Request failed: Invalid API key");

        let errored = client.ask("garble").await;
        assert!(errored.starts_with("Request errored: "));
        assert!(errored.contains("no choices"));
    }

    #[tokio::test]
    async fn test_stream_swallows_handshake_error() {
        let client = Canned::new();
        assert!(client.open_stream("reject").await.is_err());

        let snapshots: Vec<String> = client.stream("reject").await.collect().await;
        assert!(snapshots.is_empty());
    }

    #[tokio::test]
    async fn test_reader_yields_increments() {
        let mut reader = Canned::new().reader("go").await;
        assert_eq!(reader.read().await.as_deref(), Some("Hi."));
        assert_eq!(reader.read().await.as_deref(), Some(" Bye."));
        assert_eq!(reader.read().await, None);
    }
}
