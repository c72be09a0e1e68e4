mod common;

use chatsplit::client::{Client, StreamingClient};
use chatsplit::options::{HttpTransport, ModelOptions, TransportOptions};
use chatsplit::providers::OpenAiClient;
use futures::StreamExt;
use mockito::{Matcher, Server};
use serde_json::json;

use common::LogCapture;

const PATH: &str = "/v1/chat/completions";

fn client_for(server: &Server) -> OpenAiClient {
    let transport = HttpTransport::new("sk-test")
        .with_base_url(server.host_with_port())
        .with_https(false);
    OpenAiClient::new(ModelOptions::default(), TransportOptions::new(transport))
}

fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::from(": keep-alive\n\n");
    for delta in deltas {
        body.push_str(&format!(
            "data: {}\n\n",
            json!({"choices": [{"index": 0, "delta": {"content": delta}}]})
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn test_complete_returns_answer() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("authorization", "Bearer sk-test")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "max_tokens": 1000,
            "messages": [{"role": "user", "content": "Capital of France?"}],
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Paris."}}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.complete("Capital of France?").await.unwrap(), "Paris.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ask_reports_server_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#)
        .create_async()
        .await;

    let answer = client_for(&server).ask("hi").await;
    assert_eq!(answer, "Request failed: Incorrect API key provided");
}

#[tokio::test]
async fn test_ask_reports_transport_error() {
    // Nothing listens on port 9 (discard) on a test machine.
    let transport = HttpTransport::new("sk-test")
        .with_base_url("127.0.0.1:9".to_string())
        .with_https(false);
    let client = OpenAiClient::new(ModelOptions::default(), TransportOptions::new(transport));

    assert!(client.ask("hi").await.starts_with("Request errored: "));
}

#[tokio::test]
async fn test_stream_yields_cumulative_snapshots() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse_body(&["Hello", " world."]))
        .create_async()
        .await;

    let snapshots: Vec<String> = client_for(&server).stream("greet").await.collect().await;
    assert_eq!(snapshots, vec!["Hello", "Hello world."]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stream_skips_malformed_chunk() {
    let mut server = Server::new_async().await;
    let body = format!(
        "data: {}\ndata: {{not json}}\ndata: {}\ndata: [DONE]\n",
        json!({"choices": [{"delta": {"content": "A."}}]}),
        json!({"choices": [{"delta": {"content": " B."}}]}),
    );
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let logs = LogCapture::default();
    let _guard = logs.install();

    let snapshots: Vec<String> = client_for(&server).stream("go").await.collect().await;
    assert_eq!(snapshots, vec!["A.", "A. B."]);

    let logs = logs.contents();
    assert!(logs.contains("WARN"), "logs: {}", logs);
    assert!(logs.contains("skipping unparsable chunk"), "logs: {}", logs);
    assert!(logs.contains("{not json}"), "logs: {}", logs);
}

#[tokio::test]
async fn test_stream_handshake_failure_logs_and_yields_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(503)
        .with_body(r#"{"error":{"message":"The engine is currently overloaded"}}"#)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.open_stream("go").await.err().unwrap();
    assert!(err.to_string().contains("The engine is currently overloaded"));

    let logs = LogCapture::default();
    let _guard = logs.install();

    let snapshots: Vec<String> = client.stream("go").await.collect().await;
    assert!(snapshots.is_empty());

    let logs = logs.contents();
    assert!(logs.contains("ERROR"), "logs: {}", logs);
    assert!(logs.contains("The engine is currently overloaded"), "logs: {}", logs);
}

#[tokio::test]
async fn test_reader_delivers_sentences() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(sse_body(&["从前有座山", "。山上有", "座庙！Once upon", " a time. The", " end"]))
        .create_async()
        .await;

    let sentences: Vec<String> = client_for(&server)
        .reader("story")
        .await
        .into_sentences()
        .collect()
        .await;
    assert_eq!(
        sentences,
        vec!["从前有座山。", "山上有座庙！", "Once upon a time.", "The end"]
    );
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .match_body(Matcher::PartialJson(json!({
            "messages": [{"role": "user", "content": "left"}],
        })))
        .with_status(200)
        .with_body(sse_body(&["Left", " side."]))
        .create_async()
        .await;
    server
        .mock("POST", PATH)
        .match_body(Matcher::PartialJson(json!({
            "messages": [{"role": "user", "content": "right"}],
        })))
        .with_status(200)
        .with_body(sse_body(&["Right", " side."]))
        .create_async()
        .await;

    let client = client_for(&server);
    let (left, right) = tokio::join!(
        async { client.stream("left").await.collect::<Vec<_>>().await },
        async { client.stream("right").await.collect::<Vec<_>>().await },
    );
    assert_eq!(left, vec!["Left", "Left side."]);
    assert_eq!(right, vec!["Right", "Right side."]);
}
