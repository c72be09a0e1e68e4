//! OpenAI-compatible Chat Completions client.
//!
//! Works against any server exposing `POST /v1/chat/completions` with
//! bearer-token auth and `data: ` line streaming.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::client::{Client, ClientError, CumulativeStream, StreamingClient};
use crate::decoder::decode;
use crate::http::{add_extra_headers, build_http_client, chat_completions_url};
use crate::model::{server_message, ChatCompletionRequest, ChatCompletionResponse};
use crate::options::{HttpTransport, ModelOptions, TransportOptions};
use crate::sse::SSEResponseExt;

/// Answer used when the response has a message but no text in it.
pub const NO_CONTENT: &str = "(no content in response)";

/// OpenAI client using HTTP transport.
///
/// Holds its options by value; every call builds its own request, so one
/// client can serve concurrent sessions.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    model_options: ModelOptions,
    transport_options: TransportOptions<HttpTransport>,
}

impl OpenAiClient {
    pub fn new(
        model_options: ModelOptions,
        transport_options: TransportOptions<HttpTransport>,
    ) -> Self {
        Self {
            model_options,
            transport_options,
        }
    }

    /// Client configured from `OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(
            ModelOptions::from_env()?,
            TransportOptions::new(HttpTransport::from_env()?),
        ))
    }

    /// Send one chat-completions request and check the status.
    async fn send(
        request_body: &ChatCompletionRequest,
        transport_options: &TransportOptions<HttpTransport>,
    ) -> Result<reqwest::Response, ClientError> {
        let api_key = transport_options
            .provider
            .api_key
            .as_ref()
            .ok_or_else(|| ClientError::Config("API key is required".to_string()))?;

        let url = chat_completions_url(&transport_options.provider);
        tracing::debug!(
            url = %url,
            model = %request_body.model,
            stream = request_body.stream.is_some(),
            "sending chat completion"
        );

        let http_client = build_http_client(transport_options)?;

        let mut req = http_client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()))
            .header(CONTENT_TYPE, "application/json");

        req = add_extra_headers(req, &transport_options.provider.extra_headers);

        let response = req.json(request_body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::handle_error_response(status, &body));
        }

        Ok(response)
    }

    fn handle_error_response(status: reqwest::StatusCode, body: &str) -> ClientError {
        ClientError::Server {
            status: status.as_u16(),
            message: server_message(body),
        }
    }

    fn extract_answer(body: &str) -> Result<String, ClientError> {
        let response: ChatCompletionResponse = serde_json::from_str(body)
            .map_err(|e| ClientError::Structure(format!("invalid response body: {}", e)))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .ok_or_else(|| ClientError::Structure("missing choices[0].message".to_string()))?;

        let text = message.content.map(|content| content.text()).unwrap_or_default();
        let text = text.trim();
        Ok(if text.is_empty() {
            NO_CONTENT.to_string()
        } else {
            text.to_string()
        })
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new(
            ModelOptions::default(),
            TransportOptions::new(HttpTransport::default()),
        )
    }
}

#[async_trait]
impl Client for OpenAiClient {
    async fn request(
        prompt: &str,
        model_options: &ModelOptions,
        transport_options: &TransportOptions<HttpTransport>,
    ) -> Result<String, ClientError> {
        let request_body = ChatCompletionRequest::new(model_options, prompt, false);
        let response = Self::send(&request_body, transport_options).await?;
        let body = response.text().await?;
        Self::extract_answer(&body)
    }

    fn model_options(&self) -> &ModelOptions {
        &self.model_options
    }

    fn transport_options(&self) -> &TransportOptions<HttpTransport> {
        &self.transport_options
    }
}

#[async_trait]
impl StreamingClient for OpenAiClient {
    async fn request_stream(
        prompt: &str,
        model_options: &ModelOptions,
        transport_options: &TransportOptions<HttpTransport>,
    ) -> Result<CumulativeStream, ClientError> {
        let request_body = ChatCompletionRequest::new(model_options, prompt, true);
        let response = Self::send(&request_body, transport_options).await?;
        // The response moves into the stream and is dropped with it.
        Ok(Box::pin(decode(response.sse_lines())))
    }
}
