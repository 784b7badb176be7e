//! Final Synthesizer: open the whole-document summary stream.
//!
//! Takes the completed combined document (headings plus section summaries)
//! and starts the second, final generation call. A failure here is fatal to
//! the run and carries the `Synthesizing` stage.

use crate::config::SummaryConfig;
use crate::error::{DigestError, Stage};
use crate::pipeline::generate::{GenerationOptions, TextGenerator, TokenStream};
use crate::prompts;
use tracing::debug;

/// Start streaming the final synthesis for the combined document.
pub async fn open_synthesis_stream(
    generator: &dyn TextGenerator,
    combined: &str,
    config: &SummaryConfig,
) -> Result<TokenStream, DigestError> {
    let template = config
        .synthesis_prompt
        .as_deref()
        .unwrap_or(prompts::FINAL_SYNTHESIS_PROMPT);
    let prompt = prompts::render_synthesis_prompt(template, combined);
    debug!(combined_chars = combined.len(), "starting final synthesis");
    let options = GenerationOptions::from_config(config);
    generator
        .generate_stream(&prompt, &options)
        .await
        .map_err(|e| DigestError::GenerationFailed {
            stage: Stage::Synthesizing,
            detail: e.to_string(),
        })
}
