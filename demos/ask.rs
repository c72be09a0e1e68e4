//! Single-shot question against an OpenAI-compatible endpoint.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! cargo run --example ask -- "What is the capital of France?"
//! ```

use chatsplit::client::Client;
use chatsplit::providers::OpenAiClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is the capital of France? Answer in one word.".to_string());

    let client = OpenAiClient::from_env()?;

    // `ask` never fails; errors come back as readable text.
    println!("{}", client.ask(&prompt).await);

    Ok(())
}
