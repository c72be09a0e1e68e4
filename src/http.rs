//! HTTP client construction and request plumbing.

use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::options::{HttpTransport, TransportOptions};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Full chat-completions endpoint for a transport.
///
/// The scheme comes from the `https` flag and is always joined to the whole
/// host. A base URL that already names a scheme is taken as-is.
///
/// # Example
/// ```
/// use chatsplit::http::chat_completions_url;
/// use chatsplit::options::HttpTransport;
///
/// let transport = HttpTransport::default().with_base_url("localhost:8080/".to_string());
/// assert_eq!(chat_completions_url(&transport), "https://localhost:8080/v1/chat/completions");
/// ```
pub fn chat_completions_url(transport: &HttpTransport) -> String {
    let base = transport.base_url.trim().trim_end_matches('/');
    if base.contains("://") {
        return format!("{}{}", base, CHAT_COMPLETIONS_PATH);
    }
    let scheme = if transport.https { "https" } else { "http" };
    format!("{}://{}{}", scheme, base, CHAT_COMPLETIONS_PATH)
}

/// Build a configured HTTP client from transport options.
///
/// This applies common configuration like timeouts and proxies.
pub fn build_http_client(
    transport_options: &TransportOptions<HttpTransport>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.provider.proxy {
        match reqwest::Proxy::all(proxy_url) {
            Ok(proxy) => builder = builder.proxy(proxy),
            Err(e) => tracing::warn!(proxy = %proxy_url, error = %e, "ignoring invalid proxy"),
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
