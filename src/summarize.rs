//! Eager API: run a summarization to completion and return the result.
//!
//! Thin wrappers over the streaming API in [`crate::stream`] for callers who
//! only want the finished [`DocumentSummary`]: [`summarize`] for paths/URLs,
//! [`summarize_markup`] for markup already in hand, [`summarize_to_file`] to
//! also write the rendered markdown atomically, and [`convert_to_markup`]
//! for OCR-only runs that need no generator.

use crate::config::SummaryConfig;
use crate::error::DigestError;
use crate::output::DocumentSummary;
use crate::pipeline::generate::{provider_base_url, OpenAiGenerator, TextGenerator};
use crate::pipeline::input::{resolve_input, DocumentKind};
use crate::pipeline::ocr;
use crate::stream::{summarize_markup_stream, summarize_stream, SummaryEvent};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Summarize a document (local path or URL) and wait for the result.
pub async fn summarize(input: &str, config: &SummaryConfig) -> Result<DocumentSummary, DigestError> {
    let stream = summarize_stream(input, config).await?;
    drain(stream).await
}

/// Summarize markup already in hand and wait for the result.
pub async fn summarize_markup(
    markup: &str,
    config: &SummaryConfig,
) -> Result<DocumentSummary, DigestError> {
    let stream = summarize_markup_stream(markup, config).await?;
    drain(stream).await
}

/// Summarize a document and write the rendered markdown to `path`.
///
/// The write is atomic: a sibling temp file is written first and renamed
/// into place, so an interrupted run never leaves a truncated output file.
pub async fn summarize_to_file(
    input: &str,
    path: &Path,
    config: &SummaryConfig,
) -> Result<DocumentSummary, DigestError> {
    let summary = summarize(input, config).await?;
    let rendered = summary.to_markdown();

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &rendered)
        .await
        .map_err(|e| DigestError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| DigestError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    info!(path = %path.display(), "summary written");
    Ok(summary)
}

/// Run acquisition and OCR only, returning the markup. Needs no generator.
pub async fn convert_to_markup(
    input: &str,
    config: &SummaryConfig,
) -> Result<String, DigestError> {
    let resolved = resolve_input(input, config.download_timeout_secs).await?;
    match resolved.kind() {
        DocumentKind::Pdf => ocr::convert_document(resolved.path(), config).await,
        DocumentKind::Markup => tokio::fs::read_to_string(resolved.path())
            .await
            .map_err(|e| DigestError::Internal(format!("failed to read markup input: {e}"))),
    }
}

async fn drain(mut stream: crate::stream::SummaryStream) -> Result<DocumentSummary, DigestError> {
    while let Some(event) = stream.next().await {
        if let SummaryEvent::Complete(summary) = event? {
            return Ok(summary);
        }
    }
    Err(DigestError::Internal(
        "summary stream ended without a completion event".to_string(),
    ))
}

/// Resolve the generator to use for a run.
///
/// Resolution order: explicit handle in the config, then a named provider
/// plus model, then the `PAPERDIGEST_BASE_URL`/`PAPERDIGEST_MODEL` pair,
/// then `OPENAI_API_KEY` with a default model.
pub(crate) fn resolve_generator(
    config: &SummaryConfig,
) -> Result<Arc<dyn TextGenerator>, DigestError> {
    if let Some(generator) = &config.generator {
        debug!("using explicitly configured generator");
        return Ok(Arc::clone(generator));
    }

    if let Some(name) = &config.provider_name {
        let base = provider_base_url(name).ok_or_else(|| DigestError::GeneratorNotConfigured {
            provider: name.clone(),
            hint: "Known providers: openai, ollama, lmstudio, or an http(s):// base URL."
                .to_string(),
        })?;
        let model = config.model.clone().ok_or_else(|| {
            DigestError::GeneratorNotConfigured {
                provider: name.clone(),
                hint: "Set a model with SummaryConfig::builder().model(..) or --model."
                    .to_string(),
            }
        })?;
        let api_key = match name.as_str() {
            "openai" => Some(std::env::var("OPENAI_API_KEY").map_err(|_| {
                DigestError::GeneratorNotConfigured {
                    provider: name.clone(),
                    hint: "Set the OPENAI_API_KEY environment variable.".to_string(),
                }
            })?),
            _ => std::env::var("OPENAI_API_KEY").ok(),
        };
        debug!(provider = %name, model = %model, "resolved generator from provider name");
        return Ok(Arc::new(OpenAiGenerator::new(
            base,
            api_key,
            model,
            config.api_timeout_secs,
        )?));
    }

    if let (Ok(base), Ok(model)) = (
        std::env::var("PAPERDIGEST_BASE_URL"),
        std::env::var("PAPERDIGEST_MODEL"),
    ) {
        debug!(base = %base, model = %model, "resolved generator from environment");
        let api_key = std::env::var("OPENAI_API_KEY").ok();
        return Ok(Arc::new(OpenAiGenerator::new(
            base,
            api_key,
            model,
            config.api_timeout_secs,
        )?));
    }

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        debug!(model = %model, "resolved OpenAI generator from OPENAI_API_KEY");
        return Ok(Arc::new(OpenAiGenerator::new(
            "https://api.openai.com/v1",
            Some(key),
            model,
            config.api_timeout_secs,
        )?));
    }

    Err(DigestError::GeneratorNotConfigured {
        provider: "auto".to_string(),
        hint: "Pass a generator or provider in the config, set PAPERDIGEST_BASE_URL and \
               PAPERDIGEST_MODEL, or set OPENAI_API_KEY."
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_rejected() {
        let config = SummaryConfig {
            provider_name: Some("watson".to_string()),
            model: Some("m".to_string()),
            ..SummaryConfig::default()
        };
        let err = resolve_generator(&config).err().unwrap();
        assert!(matches!(err, DigestError::GeneratorNotConfigured { .. }));
        assert!(err.to_string().contains("watson"));
    }

    #[test]
    fn provider_without_model_is_rejected() {
        let config = SummaryConfig {
            provider_name: Some("ollama".to_string()),
            ..SummaryConfig::default()
        };
        let err = resolve_generator(&config).err().unwrap();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn local_provider_needs_no_api_key() {
        let config = SummaryConfig {
            provider_name: Some("ollama".to_string()),
            model: Some("llama3.2".to_string()),
            ..SummaryConfig::default()
        };
        assert!(resolve_generator(&config).is_ok());
    }

    #[test]
    fn explicit_generator_wins() {
        struct Stub;
        #[async_trait::async_trait]
        impl TextGenerator for Stub {
            async fn generate_stream(
                &self,
                _prompt: &str,
                _options: &crate::pipeline::generate::GenerationOptions,
            ) -> Result<crate::pipeline::generate::TokenStream, DigestError> {
                Ok(Box::pin(futures::stream::empty::<Result<String, DigestError>>()))
            }
        }
        let config = SummaryConfig {
            generator: Some(Arc::new(Stub)),
            provider_name: Some("watson".to_string()),
            ..SummaryConfig::default()
        };
        // The bogus provider name is never consulted.
        assert!(resolve_generator(&config).is_ok());
    }
}
