//! Section Summarizer: open the streaming summary call for one section.
//!
//! Builds the section prompt (header path as JSON plus the body, truncated
//! to the configured character budget) and starts the generation stream.
//! Consuming the stream, folding chunks, and recording failures is the
//! aggregator's job.

use crate::config::SummaryConfig;
use crate::error::DigestError;
use crate::pipeline::generate::{GenerationOptions, TextGenerator, TokenStream};
use crate::pipeline::split::Section;
use crate::prompts;
use tracing::debug;

/// Start streaming a summary for `section`.
pub async fn open_section_stream(
    generator: &dyn TextGenerator,
    section: &Section,
    config: &SummaryConfig,
) -> Result<TokenStream, DigestError> {
    let template = config
        .section_prompt
        .as_deref()
        .unwrap_or(prompts::SECTION_SUMMARY_PROMPT);
    let body = truncate_to_budget(&section.body, config.context_budget);
    if body.len() < section.body.len() {
        debug!(
            section = section.index,
            kept = body.len(),
            original = section.body.len(),
            "section body truncated to context budget"
        );
    }
    let prompt = prompts::render_section_prompt(template, &section.header_path, body);
    let options = GenerationOptions::from_config(config);
    generator.generate_stream(&prompt, &options).await
}

/// Truncate `text` to at most `budget` bytes, backing up to a char boundary.
pub(crate) fn truncate_to_budget(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut end = budget;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_budget("hello", 100), "hello");
    }

    #[test]
    fn truncation_lands_on_char_boundary() {
        // 'é' is two bytes; a budget of 3 falls mid-char.
        let text = "aéé";
        let out = truncate_to_budget(text, 3);
        assert_eq!(out, "aé");
        assert!(text.is_char_boundary(out.len()));
    }

    #[test]
    fn exact_budget_keeps_everything() {
        let text = "abcd";
        assert_eq!(truncate_to_budget(text, 4), "abcd");
    }
}
