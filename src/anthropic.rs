//! Anthropic Messages API provider
//!
//! Requests are sent with `stream: true`; text deltas from the server-sent
//! event stream are concatenated and returned once the stream ends, so the
//! caller sees a single blocking round trip.
//!
//! # Example
//!
//! ```ignore
//! let config = InterpreterConfig::from_env()?;
//! let provider = AnthropicProvider::new(&config)?;
//! let text = provider
//!     .complete(&CompletionRequest::new("Be brief.", "What does 'bet' mean?", 200))
//!     .await?;
//! ```

use crate::config::InterpreterConfig;
use crate::error::{InterpretError, InterpretResult};
use crate::language_model::{CompletionRequest, LanguageModel};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const API_VERSION: &str = "2023-06-01";
const SERVICE: &str = "Anthropic";

#[derive(Clone)]
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a provider from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(InterpretError)` - If the API key is empty or the HTTP client cannot be built
    pub fn new(config: &InterpreterConfig) -> InterpretResult<Self> {
        config.require_credential()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
            base_url: config.model_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "system": request.system_prompt,
            "messages": [
                { "role": "user", "content": request.user_message }
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "stream": true
        })
    }
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl LanguageModel for AnthropicProvider {
    async fn complete(&self, request: &CompletionRequest) -> InterpretResult<String> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InterpretError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let mut collector = StreamCollector::default();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            collector.feed(&chunk?)?;
        }
        let text = collector.finish()?;

        debug!(
            model = %self.model,
            chars = text.chars().count(),
            "Received streamed completion"
        );
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}

/// Subset of the Messages streaming events this provider reacts to
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error { error: StreamErrorBody },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Reassembles server-sent event lines split across network chunks and
/// concatenates the text deltas they carry.
#[derive(Debug, Default)]
struct StreamCollector {
    pending: Vec<u8>,
    text: String,
    stopped: bool,
}

impl StreamCollector {
    fn feed(&mut self, bytes: &[u8]) -> InterpretResult<()> {
        self.pending.extend_from_slice(bytes);
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.handle_line(&String::from_utf8_lossy(&line))?;
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> InterpretResult<()> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(data) = line.strip_prefix("data:") else {
            // event names, comments and blank separators carry no payload
            return Ok(());
        };
        if self.stopped {
            return Ok(());
        }

        let event: StreamEvent = serde_json::from_str(data.trim_start()).map_err(|e| {
            InterpretError::malformed(SERVICE, format!("invalid stream event: {}", e))
        })?;

        match event {
            StreamEvent::ContentBlockDelta { delta } => {
                if let Some(text) = delta.text {
                    self.text.push_str(&text);
                }
            }
            StreamEvent::MessageStop => self.stopped = true,
            StreamEvent::Error { error } => {
                return Err(InterpretError::Model(format!(
                    "{}: {}",
                    error.kind, error.message
                )));
            }
            StreamEvent::Other => {}
        }
        Ok(())
    }

    fn finish(mut self) -> InterpretResult<String> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.handle_line(&String::from_utf8_lossy(&rest))?;
        }
        if !self.stopped {
            return Err(InterpretError::malformed(
                SERVICE,
                "stream ended before message_stop",
            ));
        }
        Ok(self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const STREAM: &str = "event: message_start\n\
data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"usage\":{\"input_tokens\":12}}}\n\
\n\
event: content_block_start\n\
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\
\n\
event: ping\n\
data: {\"type\": \"ping\"}\n\
\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"['no cap', \"}}\n\
\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"'drip']\"}}\n\
\n\
event: content_block_stop\n\
data: {\"type\":\"content_block_stop\",\"index\":0}\n\
\n\
event: message_delta\n\
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":9}}\n\
\n\
event: message_stop\n\
data: {\"type\":\"message_stop\"}\n\
\n";

    fn config_for(server: &MockServer) -> InterpreterConfig {
        InterpreterConfig::default()
            .with_api_key("test-key")
            .with_model("claude-test")
            .with_model_base_url(server.uri())
    }

    // ========== Stream Collector ==========

    #[test]
    fn test_collector_whole_stream() {
        let mut collector = StreamCollector::default();
        collector.feed(STREAM.as_bytes()).unwrap();
        assert_eq!(collector.finish().unwrap(), "['no cap', 'drip']");
    }

    #[test]
    fn test_collector_lines_split_across_chunks() {
        let mut collector = StreamCollector::default();
        for chunk in STREAM.as_bytes().chunks(7) {
            collector.feed(chunk).unwrap();
        }
        assert_eq!(collector.finish().unwrap(), "['no cap', 'drip']");
    }

    #[test]
    fn test_collector_crlf_and_missing_final_newline() {
        let mut collector = StreamCollector::default();
        collector
            .feed(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"lit\"}}\r\n")
            .unwrap();
        collector
            .feed(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"!\"}}\r\n")
            .unwrap();
        collector.feed(b"data: {\"type\":\"message_stop\"}").unwrap();
        assert_eq!(collector.finish().unwrap(), "lit!");
    }

    #[test]
    fn test_collector_truncated_stream_is_error() {
        let mut collector = StreamCollector::default();
        collector
            .feed(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"['no ca\"}}\n")
            .unwrap();
        match collector.finish() {
            Err(InterpretError::MalformedResponse { message, .. }) => {
                assert!(message.contains("message_stop"))
            }
            other => panic!("Expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_collector_empty_stream_is_error() {
        assert!(matches!(
            StreamCollector::default().finish(),
            Err(InterpretError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_collector_error_event() {
        let mut collector = StreamCollector::default();
        let result = collector.feed(
            b"event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n",
        );
        match result {
            Err(InterpretError::Model(msg)) => {
                assert!(msg.contains("overloaded_error"));
                assert!(msg.contains("Overloaded"));
            }
            _ => panic!("Expected Model error"),
        }
    }

    #[test]
    fn test_collector_invalid_json() {
        let mut collector = StreamCollector::default();
        let result = collector.feed(b"data: not json\n");
        assert!(matches!(
            result,
            Err(InterpretError::MalformedResponse { .. })
        ));
    }

    // ========== Initialization ==========

    #[test]
    fn test_new_requires_key() {
        let result = AnthropicProvider::new(&InterpreterConfig::default());
        match result {
            Err(InterpretError::Config(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_debug_output() {
        let config = InterpreterConfig::default().with_api_key("sk-ant-secret");
        let provider = AnthropicProvider::new(&config).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("sk-ant-secret"));
        assert_eq!(provider.provider_name(), "Anthropic");
    }

    // ========== HTTP ==========

    #[tokio::test]
    async fn test_complete_streams_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(json!({
                "model": "claude-test",
                "system": "Find slang.",
                "messages": [{ "role": "user", "content": "['no cap']" }],
                "max_tokens": 1000,
                "stream": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(STREAM, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config_for(&server)).unwrap();
        let text = provider
            .complete(&CompletionRequest::new("Find slang.", "['no cap']", 1000))
            .await
            .unwrap();
        assert_eq!(text, "['no cap', 'drip']");
    }

    #[tokio::test]
    async fn test_complete_non_event_stream_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<html>gateway</html>", "text/html"),
            )
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config_for(&server)).unwrap();
        let result = provider
            .complete(&CompletionRequest::new("s", "u", 10))
            .await;
        assert!(
            matches!(result, Err(InterpretError::MalformedResponse { .. })),
            "got {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_complete_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config_for(&server)).unwrap();
        let result = provider
            .complete(&CompletionRequest::new("s", "u", 10))
            .await;
        match result {
            Err(InterpretError::Api {
                status, message, ..
            }) => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid x-api-key"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_real_api_completion() {
        let Ok(config) = InterpreterConfig::from_env() else {
            eprintln!("Skipping: CLAUDE_API_KEY not set");
            return;
        };
        let provider = AnthropicProvider::new(&config).unwrap();
        let text = provider
            .complete(&CompletionRequest::new(
                "Answer with one word.",
                "What colour is the sky?",
                20,
            ))
            .await
            .unwrap();
        assert!(!text.is_empty());
    }
}
