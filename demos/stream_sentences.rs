//! Stream a completion and print it one sentence per line.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! export OPENAI_BASE_URL="api.openai.com"   # host only, scheme from OPENAI_HTTPS
//! RUST_LOG=chatsplit=debug cargo run --example stream_sentences
//! ```

use chatsplit::client::StreamingClient;
use chatsplit::providers::OpenAiClient;
use chatsplit::sentence::split_sentences;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Write a 200-word story.".to_string());

    let client = OpenAiClient::from_env()?;
    let mut reader = client.reader(&prompt).await;

    // Feed each increment into the pending text and print whatever
    // sentences it completes.
    let mut collected = String::new();
    while let Some(part) = reader.read().await {
        collected.push_str(&part);
        let (sentences, rest) = split_sentences(&collected);
        collected = rest;

        for sentence in sentences {
            println!("{}", sentence);
        }
    }

    let tail = collected.trim();
    if !tail.is_empty() {
        println!("{}", tail);
    }

    Ok(())
}
