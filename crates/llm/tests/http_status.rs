//! Status mapping against a one-shot local HTTP responder.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use educ_llm::{LlmClient, LlmConfig, LlmError};

/// Serve exactly one request with the given raw status line and body.
async fn one_shot_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 4096];
        // Read headers, then as much body as Content-Length announces.
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&received);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if received.len() >= end + 4 + length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{addr}")
}

fn client_for(api_url: String) -> LlmClient {
    LlmClient::new(LlmConfig {
        api_url,
        api_key: Some("test-key".into()),
        ..LlmConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let url = one_shot_server("429 Too Many Requests", r#"{"error":"slow down"}"#).await;
    let result = client_for(url).chat_json("system", "user").await;
    assert!(matches!(result, Err(LlmError::RateLimited)), "{result:?}");
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let url = one_shot_server("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    match client_for(url).embed("texte").await {
        Err(LlmError::ApiError { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_json_parses_message_content() {
    let url = one_shot_server(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"{\"answer\":\"oui\"}"}}]}"#,
    )
    .await;
    let value = client_for(url).chat_json("system", "user").await.unwrap();
    assert_eq!(value["answer"], "oui");
}

#[tokio::test]
async fn embed_returns_vector() {
    let url = one_shot_server("200 OK", r#"{"data":[{"embedding":[0.5,1.5]}]}"#).await;
    let embedding = client_for(url).embed("texte").await.unwrap();
    assert_eq!(embedding, vec![0.5, 1.5]);
}
