//! Text generation capability.
//!
//! The pipeline never talks to a model vendor directly; it calls
//! [`TextGenerator::generate_stream`] on a handle the caller supplies (or
//! that is resolved from a provider name / environment). The trait returns a
//! [`TokenStream`] of token deltas in arrival order, so section summaries and
//! the final synthesis can be surfaced incrementally.
//!
//! [`OpenAiGenerator`] is the shipped implementation: an OpenAI-compatible
//! `chat/completions` client using server-sent events. It works against the
//! OpenAI API itself and against compatible local endpoints (Ollama,
//! LM Studio).

use crate::error::DigestError;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// Token deltas in arrival order. An `Err` item ends the stream.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, DigestError>> + Send>>;

/// Sampling parameters for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Generation cap, in tokens.
    pub max_tokens: usize,
}

impl GenerationOptions {
    /// Lift the generation-relevant fields out of a run config.
    pub fn from_config(config: &crate::config::SummaryConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// A streaming text generation capability.
///
/// Implementations must be cheap to share (`Arc`) and must report transport
/// failures as [`DigestError::ApiError`]; the pipeline attaches the stage.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Start a streaming generation for `prompt`.
    ///
    /// Returns as soon as the request is accepted; tokens arrive on the
    /// stream. A mid-stream failure is delivered as the stream's final
    /// `Err` item.
    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TokenStream, DigestError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    content: Option<String>,
}

/// Parse one SSE `data:` payload into its content delta, if any.
///
/// Returns `None` for the `[DONE]` sentinel, keep-alives, and chunks without
/// a content delta (role headers, finish markers).
fn delta_from_sse(data: &str) -> Option<String> {
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    match serde_json::from_str::<ChatChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .filter(|s| !s.is_empty()),
        Err(e) => {
            warn!("skipping unparseable SSE chunk: {e}");
            None
        }
    }
}

/// OpenAI-compatible streaming chat client.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiGenerator {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// `api_key` is optional; local endpoints usually run without one.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, DigestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DigestError::Internal(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            api_key,
            model: model.into(),
        })
    }

    /// The model identifier requests are issued for.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TokenStream, DigestError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: true,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(model = %self.model, url = %url, "starting streaming generation");
        let response = request.send().await.map_err(|e| DigestError::ApiError {
            detail: format!("request to {url} failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DigestError::ApiError {
                detail: format!("{url} returned {status}: {text}"),
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, DigestError>>(32);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            // SSE lines can split across network chunks, and chunk boundaries
            // can split UTF-8 sequences. Buffer raw bytes and only decode
            // complete lines.
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx
                            .send(Err(DigestError::ApiError {
                                detail: format!("stream interrupted: {e}"),
                            }))
                            .await;
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);
                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line);
                    let Some(data) = line.trim_start().strip_prefix("data:") else {
                        continue;
                    };
                    if data.trim() == "[DONE]" {
                        return;
                    }
                    if let Some(delta) = delta_from_sse(data) {
                        if tx.send(Ok(delta)).await.is_err() {
                            // Receiver dropped: generation abandoned.
                            return;
                        }
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Base URL for a named provider, or `None` if the name is unknown.
///
/// `http(s)://` names are treated as custom base URLs.
pub(crate) fn provider_base_url(name: &str) -> Option<&str> {
    match name {
        "openai" => Some("https://api.openai.com/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        "lmstudio" => Some("http://localhost:1234/v1"),
        custom if custom.starts_with("http://") || custom.starts_with("https://") => Some(custom),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_extracts_content() {
        let data = r#"{"choices":[{"delta":{"content":"Hello"}}]}"#;
        assert_eq!(delta_from_sse(data).as_deref(), Some("Hello"));
    }

    #[test]
    fn done_sentinel_and_empty_deltas_are_skipped() {
        assert_eq!(delta_from_sse("[DONE]"), None);
        assert_eq!(delta_from_sse(""), None);
        let role_only = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(delta_from_sse(role_only), None);
        let finish = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        assert_eq!(delta_from_sse(finish), None);
    }

    #[test]
    fn garbage_chunks_are_skipped_not_fatal() {
        assert_eq!(delta_from_sse("not json at all"), None);
    }

    #[test]
    fn known_providers_resolve() {
        assert_eq!(provider_base_url("openai"), Some("https://api.openai.com/v1"));
        assert_eq!(provider_base_url("ollama"), Some("http://localhost:11434/v1"));
        assert_eq!(provider_base_url("lmstudio"), Some("http://localhost:1234/v1"));
        assert_eq!(
            provider_base_url("http://10.0.0.5:8080/v1"),
            Some("http://10.0.0.5:8080/v1")
        );
        assert_eq!(provider_base_url("anthropic"), None);
    }

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let gen =
            OpenAiGenerator::new("http://localhost:11434/v1/", None, "llama3.2", 300).unwrap();
        assert_eq!(gen.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn debug_redacts_api_key() {
        let gen = OpenAiGenerator::new(
            "https://api.openai.com/v1",
            Some("sk-secret".into()),
            "gpt-4o-mini",
            300,
        )
        .unwrap();
        let rendered = format!("{gen:?}");
        assert!(!rendered.contains("sk-secret"));
    }
}
