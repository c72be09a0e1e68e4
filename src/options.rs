//! Model and transport configuration.
//!
//! Values are resolved once (explicitly or from the environment) and then
//! only read. A client keeps its own copy, so no request ever observes
//! another request's settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::client::ClientError;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_BASE_URL: &str = "api.openai.com";

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Model behavior parameters sent with every request.
///
/// # Example
/// ```rust
/// use chatsplit::options::ModelOptions;
///
/// let options = ModelOptions::default()
///     .with_model("gpt-4o-mini".to_string())
///     .with_temperature(0.2);
/// assert_eq!(options.max_tokens, 1000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelOptions {
    /// Model identifier (e.g., "gpt-4o")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: f32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ModelOptions {
    /// Read `OPENAI_MODEL`, `OPENAI_MAX_TOKENS` and `OPENAI_TEMPERATURE`.
    ///
    /// Unset variables keep their defaults; unparsable ones are an error.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let defaults = Self::default();
        Ok(Self {
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_var(&lookup, "OPENAI_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
            temperature: parse_var(&lookup, "OPENAI_TEMPERATURE")?.unwrap_or(defaults.temperature),
        })
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Transport configuration: the generic part plus HTTP specifics.
///
/// # Example
/// ```rust
/// use chatsplit::options::{TransportOptions, HttpTransport, SecretString};
/// use std::time::Duration;
///
/// let options = TransportOptions {
///     timeout: Some(Duration::from_secs(30)),
///     provider: HttpTransport::new(SecretString::new("sk-...".to_string()))
///         .with_base_url("localhost:8080".to_string())
///         .with_https(false),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct TransportOptions<T> {
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,

    /// Provider-specific transport options
    pub provider: T,
}

impl<T> TransportOptions<T> {
    /// Create new transport options with provider-specific configuration.
    pub fn new(provider: T) -> Self {
        Self {
            timeout: None,
            provider,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP-specific transport options.
/// Used as the provider field in `TransportOptions<HttpTransport>`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Static bearer token
    pub api_key: Option<SecretString>,

    /// Host (and optional port/path prefix) of the API, without scheme
    pub base_url: String,

    /// Use `https://` (true) or `http://` (false)
    pub https: bool,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            https: true,
            proxy: None,
            extra_headers: None,
        }
    }
}

impl HttpTransport {
    /// Create new HTTP transport options with an API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_HTTPS`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut transport = Self {
            api_key: lookup("OPENAI_API_KEY").map(SecretString::from),
            ..Self::default()
        };
        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            transport.base_url = base_url;
        }
        if let Some(flag) = lookup("OPENAI_HTTPS") {
            transport.https = parse_flag(&flag).ok_or_else(|| {
                ClientError::Config(format!("OPENAI_HTTPS: expected a boolean, got {:?}", flag))
            })?;
        }
        Ok(transport)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Choose between `https://` and `http://`.
    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ClientError>
where
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| ClientError::Config(format!("{}: {}", key, e)))
        })
        .transpose()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
