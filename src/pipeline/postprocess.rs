//! Text normalisation: OCR markup fixes and generated-text cleanup.
//!
//! Two concerns, both pure string functions:
//!
//! * [`normalise_math_delimiters`] fixes the OCR tool's LaTeX-style math
//!   delimiters so downstream markdown renderers (and models) see standard
//!   `$`/`$$` math.
//! * [`clean_generated`] tidies model output before it is stored: code-fence
//!   wrappers stripped, line endings normalised, blank runs collapsed. It is
//!   applied only to final stored values, never to in-flight stream
//!   snapshots, which must only ever grow.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replace LaTeX-style math delimiters with markdown-friendly ones:
/// `\(`/`\)` become `$`, `\[`/`\]` become `$$`.
pub fn normalise_math_delimiters(markup: &str) -> String {
    markup
        .replace("\\(", "$")
        .replace("\\)", "$")
        .replace("\\[", "$$")
        .replace("\\]", "$$")
}

static FENCE_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A\s*```[a-zA-Z]*\r?\n(.*?)\r?\n?```\s*\z").unwrap()
});

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Clean generated text for storage.
///
/// Strips a whole-output code-fence wrapper (models sometimes fence their
/// markdown answer), normalises CRLF to LF, trims trailing whitespace per
/// line, collapses runs of blank lines, and ensures a single final newline.
/// Empty input stays empty.
pub fn clean_generated(text: &str) -> String {
    let unfenced = match FENCE_WRAPPER.captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(text),
        None => text,
    };

    let unix = unfenced.replace("\r\n", "\n");
    let trimmed_lines: Vec<&str> = unix.lines().map(str::trim_end).collect();
    let rejoined = trimmed_lines.join("\n");
    let collapsed = BLANK_RUN.replace_all(&rejoined, "\n\n");

    let body = collapsed.trim();
    if body.is_empty() {
        return String::new();
    }
    format!("{body}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_delimiters_are_rewritten() {
        let input = r"inline \(x^2\) and display \[E = mc^2\] math";
        assert_eq!(
            normalise_math_delimiters(input),
            "inline $x^2$ and display $$E = mc^2$$ math"
        );
    }

    #[test]
    fn text_without_delimiters_is_unchanged() {
        let input = "plain prose with $existing$ math";
        assert_eq!(normalise_math_delimiters(input), input);
    }

    #[test]
    fn fence_wrapper_is_stripped() {
        let input = "```markdown\n- a bullet\n- another\n```";
        assert_eq!(clean_generated(input), "- a bullet\n- another\n");
    }

    #[test]
    fn inner_fences_survive() {
        let input = "intro\n```rust\nfn main() {}\n```\noutro";
        let cleaned = clean_generated(input);
        assert!(cleaned.contains("```rust"));
        assert!(cleaned.contains("fn main() {}"));
    }

    #[test]
    fn crlf_and_blank_runs_are_normalised() {
        let input = "line one\r\n\r\n\r\n\r\nline two   \r\n";
        assert_eq!(clean_generated(input), "line one\n\nline two\n");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_generated(""), "");
        assert_eq!(clean_generated("   \n  \n"), "");
    }

    #[test]
    fn output_ends_with_single_newline() {
        assert_eq!(clean_generated("- bullet"), "- bullet\n");
        assert_eq!(clean_generated("- bullet\n\n\n"), "- bullet\n");
    }
}
