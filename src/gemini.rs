use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use crate::workout::{GenerationError, PlanGenerator};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Endpoint without the credential; the key is attached as a query pair
    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// The request URL carries the key, so it is stripped before the error is shown or logged
fn transport_failure(e: reqwest::Error) -> GenerationError {
    GenerationError::TransportFailure(e.without_url().to_string())
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
pub fn extract_text(body: &str) -> Result<String, GenerationError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| GenerationError::MalformedResponse("no text in response".to_string()))
}

#[async_trait]
impl PlanGenerator for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingCredential);
        }

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.build_url())
            .query(&[("key", &self.api_key)])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::BadStatus(status.to_string()));
        }

        let body = response
            .text()
            .await
            .map_err(transport_failure)?;
        debug!(bytes = body.len(), "gemini response received");

        extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::failure_message;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve a single canned HTTP response and hand back the raw request
    async fn serve_once(status_line: &str, body: &str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&buf).to_string());
        });

        (format!("http://{}", addr), rx)
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Coach's Note: rest"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Coach's Note: rest");
    }

    #[test]
    fn test_extract_text_malformed() {
        assert!(matches!(
            extract_text("not json"),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_text(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_build_url_leaves_out_key() {
        let client = GeminiClient::new("secret", DEFAULT_MODEL);
        assert_eq!(
            client.build_url(),
            format!("{}/models/{}:generateContent", API_BASE_URL, DEFAULT_MODEL)
        );
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        // Nothing listens on the discard port; reaching it would be a transport failure
        let client = GeminiClient::new("", DEFAULT_MODEL).with_base_url("http://127.0.0.1:9");
        assert_eq!(
            client.generate("legs").await,
            Err(GenerationError::MissingCredential)
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let client = GeminiClient::new("key", DEFAULT_MODEL).with_base_url("http://127.0.0.1:9");
        assert!(matches!(
            client.generate("legs").await,
            Err(GenerationError::TransportFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_hides_key() {
        let client = GeminiClient::new("SUPERSECRETKEY", DEFAULT_MODEL)
            .with_base_url("http://127.0.0.1:9");
        let err = client.generate("legs").await.unwrap_err();

        assert!(!err.to_string().contains("SUPERSECRETKEY"));
        let shown = failure_message(&err);
        assert!(shown.starts_with("Error generating workout."));
        assert!(!shown.contains("SUPERSECRETKEY"));
    }

    #[tokio::test]
    async fn test_generate_success_wire_format() {
        let (base_url, request_rx) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"1. Squats\n2. Lunges"}]}}]}"#,
        )
        .await;
        let client = GeminiClient::new("abc", "test-model").with_base_url(&base_url);

        let text = client.generate("make a plan").await.unwrap();
        assert_eq!(text, "1. Squats\n2. Lunges");

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /models/test-model:generateContent?key=abc HTTP/1.1"));
        assert!(request.to_lowercase().contains("content-type: application/json"));
        assert!(request.contains(r#"{"contents":[{"parts":[{"text":"make a plan"}]}]}"#));
    }

    #[tokio::test]
    async fn test_generate_bad_status() {
        let (base_url, _rx) = serve_once("403 Forbidden", r#"{"error":{"message":"denied"}}"#).await;
        let client = GeminiClient::new("abc", "test-model").with_base_url(&base_url);

        assert_eq!(
            client.generate("x").await,
            Err(GenerationError::BadStatus("403 Forbidden".to_string()))
        );
    }
}
