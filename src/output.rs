//! Result types for summarization runs.
//!
//! A run produces a [`DocumentSummary`]: per-section results, the combined
//! summary document, the final synthesis, and run statistics. Section-level
//! failures are recorded on their [`SectionSummary`] rather than failing the
//! run; callers who want strictness use [`DocumentSummary::into_result`].
//! Everything serialises for the CLI's `--json` mode.

use crate::error::{DigestError, SectionError};
use crate::pipeline::split::HeaderPath;
use serde::{Deserialize, Serialize};

/// The outcome for a single section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSummary {
    /// 1-based section index in document order.
    pub index: usize,
    /// Reconstructed heading line (deepest header level), if any.
    pub heading: Option<String>,
    /// Full header context of the section.
    pub header_path: HeaderPath,
    /// Generated summary text; empty when skipped or failed.
    pub summary: String,
    /// Time spent generating this section's summary.
    pub duration_ms: u64,
    /// True when the section had no body and generation was skipped.
    pub skipped: bool,
    /// The failure, if this section failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<SectionError>,
}

impl SectionSummary {
    /// True when this section produced a usable summary.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.skipped
    }
}

/// Run statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Sections found by the splitter.
    pub total_sections: usize,
    /// Sections that produced a summary.
    pub summarized_sections: usize,
    /// Sections that failed.
    pub failed_sections: usize,
    /// Sections skipped for having no body.
    pub skipped_sections: usize,
    /// Time spent in OCR conversion (zero for markup inputs).
    pub convert_duration_ms: u64,
    /// Time spent in generation calls (sections + synthesis).
    pub generation_duration_ms: u64,
    /// Wall-clock time for the whole run.
    pub total_duration_ms: u64,
}

/// The complete result of a summarization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// The intermediate markup, when `include_markup` was set.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub markup: Option<String>,
    /// The combined summary document: reconstructed headings and section
    /// summaries in document order.
    pub combined: String,
    /// The final whole-document synthesis.
    pub synthesis: String,
    /// Per-section outcomes, in document order.
    pub sections: Vec<SectionSummary>,
    /// Run statistics.
    pub stats: SummaryStats,
}

impl DocumentSummary {
    /// True when at least one section failed.
    pub fn has_failures(&self) -> bool {
        self.stats.failed_sections > 0
    }

    /// Treat any section failure as an error.
    pub fn into_result(self) -> Result<DocumentSummary, DigestError> {
        if self.has_failures() {
            return Err(DigestError::PartialFailure {
                succeeded: self.stats.summarized_sections,
                failed: self.stats.failed_sections,
                total: self.stats.total_sections,
            });
        }
        Ok(self)
    }

    /// Render the run as a single markdown document: the combined section
    /// summaries followed by the synthesis under an `Overall Summary` rule.
    pub fn to_markdown(&self) -> String {
        let mut out = String::with_capacity(self.combined.len() + self.synthesis.len() + 64);
        out.push_str(self.combined.trim_end());
        out.push_str("\n\n---\n\n# Overall Summary\n\n");
        out.push_str(self.synthesis.trim_end());
        out.push('\n');
        out
    }
}
