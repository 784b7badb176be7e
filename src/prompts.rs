//! Prompt templates for section summaries and the final synthesis.
//!
//! Both templates live here so prompt wording can be reviewed in one place;
//! callers may override either through `SummaryConfig`. Placeholders use
//! `{name}` and are substituted with plain string replacement, no templating
//! engine.

use crate::pipeline::split::HeaderPath;

/// Template for one section's summary.
///
/// Placeholders: `{headers}` is the section's header path as a JSON object,
/// `{content}` the section body.
pub const SECTION_SUMMARY_PROMPT: &str = "\
You are summarizing one section of an academic paper.

Section headers (JSON): {headers}

Section content:
{content}

Write a concise summary of this section as a markdown bullet list.
Use between 2 and 5 bullets. Each bullet states one concrete finding,
method, or claim from the section. Do not add a heading, preamble, or
closing remark; output only the bullets.";

/// Template for the whole-document synthesis.
///
/// Placeholder: `{docs}`, the combined per-section summary document,
/// including reconstructed headings.
pub const FINAL_SYNTHESIS_PROMPT: &str = "\
You are writing the final summary of an academic paper, based on the
per-section summaries below (headings preserved from the paper).

{docs}

Write the following, in order:

1. A short paragraph describing the paper's key contributions.
2. Exactly 3 takeaways, as a numbered list, each one sentence.
3. 5 questions you would ask the authors, as a numbered list.

Ground every statement in the summaries above; do not invent results.";

/// Render the section-summary prompt for one section.
pub fn render_section_prompt(template: &str, headers: &HeaderPath, body: &str) -> String {
    template
        .replace("{headers}", &headers.to_prompt_json())
        .replace("{content}", body)
}

/// Render the final-synthesis prompt for the combined document.
pub fn render_synthesis_prompt(template: &str, docs: &str) -> String {
    template.replace("{docs}", docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_prompt_interpolates_headers_and_body() {
        let mut path = HeaderPath::default();
        path.set(1, "Introduction");
        let prompt = render_section_prompt(SECTION_SUMMARY_PROMPT, &path, "the body text");
        assert!(prompt.contains(r#"{"Header 1":"Introduction"}"#));
        assert!(prompt.contains("the body text"));
        assert!(!prompt.contains("{headers}"));
        assert!(!prompt.contains("{content}"));
    }

    #[test]
    fn empty_header_path_renders_empty_object() {
        let prompt = render_section_prompt(SECTION_SUMMARY_PROMPT, &HeaderPath::default(), "x");
        assert!(prompt.contains("(JSON): {}"));
    }

    #[test]
    fn synthesis_prompt_interpolates_docs() {
        let prompt = render_synthesis_prompt(FINAL_SYNTHESIS_PROMPT, "# A\n- bullet");
        assert!(prompt.contains("# A\n- bullet"));
        assert!(!prompt.contains("{docs}"));
    }

    #[test]
    fn templates_state_the_output_contract() {
        assert!(SECTION_SUMMARY_PROMPT.contains("between 2 and 5 bullets"));
        assert!(FINAL_SYNTHESIS_PROMPT.contains("Exactly 3 takeaways"));
        assert!(FINAL_SYNTHESIS_PROMPT.contains("5 questions"));
    }
}
