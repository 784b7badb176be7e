//! Error types for the paperdigest library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DigestError`] is **fatal**: the run cannot proceed (document missing,
//!   OCR failed, generator not configured, final synthesis failed). Returned
//!   as `Err(DigestError)` from the top-level `summarize*` functions, and
//!   tagged with the pipeline [`Stage`] that produced it.
//!
//! * [`SectionError`] is **non-fatal**: a single section's summary failed but
//!   the rest of the document is fine. Stored inside
//!   [`crate::output::SectionSummary`] so callers can inspect partial
//!   success rather than losing the whole document to one bad section.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! section failure (`fail_fast`), or continue and collect errors for a
//! post-run report (the default).

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The pipeline stage at which a fatal error occurred.
///
/// The run moves through `Acquiring → Converting → Splitting → Summarizing →
/// Synthesizing`; every [`DigestError`] maps back to exactly one of these via
/// [`DigestError::stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resolving the input path or downloading the document.
    Acquiring,
    /// Running the external OCR tool on the document.
    Converting,
    /// Splitting the markup into header-scoped sections.
    Splitting,
    /// Streaming per-section summaries.
    Summarizing,
    /// Streaming the whole-document synthesis.
    Synthesizing,
    /// Configuration or generator setup, before the pipeline starts.
    Setup,
    /// Writing results after the pipeline finished.
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Acquiring => "acquisition",
            Stage::Converting => "conversion",
            Stage::Splitting => "splitting",
            Stage::Summarizing => "section summarization",
            Stage::Synthesizing => "final synthesis",
            Stage::Setup => "setup",
            Stage::Output => "output",
        };
        f.write_str(s)
    }
}

/// All fatal errors returned by the paperdigest library.
///
/// Section-level failures use [`SectionError`] and are stored in
/// [`crate::output::SectionSummary`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DigestError {
    // ── Acquisition errors ────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The OCR command could not be started at all.
    #[error("failed to launch OCR command '{command}': {reason}\nIs it installed and on PATH?")]
    OcrLaunchFailed { command: String, reason: String },

    /// The OCR command ran but exited with a failure status.
    #[error("OCR command exited with {status}: {stderr}")]
    OcrFailed { status: String, stderr: String },

    /// The OCR command exceeded the configured timeout.
    #[error("OCR timed out after {secs}s for '{path}'\nIncrease --ocr-timeout.")]
    OcrTimeout { path: PathBuf, secs: u64 },

    /// The OCR command succeeded but left no markup file behind.
    #[error("OCR produced no markup at '{path}'")]
    OcrOutputMissing { path: PathBuf },

    // ── Structure errors ──────────────────────────────────────────────────
    /// The markup contains nothing to summarise (blank or whitespace only).
    #[error("document contains no summarisable content")]
    EmptyDocument,

    // ── Generation errors ─────────────────────────────────────────────────
    /// No text generator could be resolved (missing API key etc.).
    #[error("text generator '{provider}' is not configured.\n{hint}")]
    GeneratorNotConfigured { provider: String, hint: String },

    /// Transport-level failure reported by a [`crate::pipeline::generate::TextGenerator`].
    ///
    /// Pipeline code wraps this into [`DigestError::GenerationFailed`] (or a
    /// [`SectionError`]) with the stage attached before surfacing it.
    #[error("text generation API error: {detail}")]
    ApiError { detail: String },

    /// A generation call failed at a known pipeline stage.
    #[error("generation failed during {stage}: {detail}")]
    GenerationFailed { stage: Stage, detail: String },

    /// The generator completed but produced no usable text.
    #[error("generator returned empty output during {stage}")]
    EmptyGeneration { stage: Stage },

    /// Every section that was attempted failed; output would be empty.
    #[error("all {total} sections failed.\nFirst error: {first_error}")]
    AllSectionsFailed { total: usize, first_error: String },

    /// A section failed while `fail_fast` was enabled.
    #[error("section {index} failed: {detail}")]
    SectionAborted { index: usize, detail: String },

    /// Some sections succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::DocumentSummary::into_result`] when the
    /// caller wants to treat any section failure as an error.
    #[error("{failed}/{total} sections failed during summarization")]
    PartialFailure {
        succeeded: usize,
        failed: usize,
        total: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DigestError {
    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            DigestError::FileNotFound { .. }
            | DigestError::PermissionDenied { .. }
            | DigestError::InvalidInput { .. }
            | DigestError::DownloadFailed { .. }
            | DigestError::DownloadTimeout { .. } => Stage::Acquiring,

            DigestError::OcrLaunchFailed { .. }
            | DigestError::OcrFailed { .. }
            | DigestError::OcrTimeout { .. }
            | DigestError::OcrOutputMissing { .. } => Stage::Converting,

            DigestError::EmptyDocument => Stage::Splitting,

            DigestError::ApiError { .. }
            | DigestError::AllSectionsFailed { .. }
            | DigestError::SectionAborted { .. }
            | DigestError::PartialFailure { .. } => Stage::Summarizing,

            DigestError::GenerationFailed { stage, .. }
            | DigestError::EmptyGeneration { stage } => *stage,

            DigestError::GeneratorNotConfigured { .. }
            | DigestError::InvalidConfig(_)
            | DigestError::Internal(_) => Stage::Setup,

            DigestError::OutputWriteFailed { .. } => Stage::Output,
        }
    }
}

/// A non-fatal error for a single section.
///
/// Stored alongside [`crate::output::SectionSummary`] when a section fails.
/// The overall run continues unless ALL attempted sections fail or
/// `fail_fast` is set.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum SectionError {
    /// The streaming generation call failed mid-section.
    #[error("section {index}: generation failed: {detail}")]
    GenerationFailed { index: usize, detail: String },

    /// The generation call completed but produced no text.
    #[error("section {index}: generator returned an empty summary")]
    EmptySummary { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = DigestError::PartialFailure {
            succeeded: 9,
            failed: 1,
            total: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/10"), "got: {msg}");
    }

    #[test]
    fn ocr_errors_map_to_converting_stage() {
        let launch = DigestError::OcrLaunchFailed {
            command: "nougat".into(),
            reason: "not found".into(),
        };
        assert_eq!(launch.stage(), Stage::Converting);

        let timeout = DigestError::OcrTimeout {
            path: "paper.pdf".into(),
            secs: 600,
        };
        assert_eq!(timeout.stage(), Stage::Converting);
    }

    #[test]
    fn generation_errors_carry_their_stage() {
        let e = DigestError::GenerationFailed {
            stage: Stage::Synthesizing,
            detail: "HTTP 500".into(),
        };
        assert_eq!(e.stage(), Stage::Synthesizing);
        assert!(e.to_string().contains("final synthesis"));
    }

    #[test]
    fn empty_document_is_a_splitting_failure() {
        assert_eq!(DigestError::EmptyDocument.stage(), Stage::Splitting);
    }

    #[test]
    fn section_error_display_names_the_section() {
        let e = SectionError::GenerationFailed {
            index: 3,
            detail: "connection reset".into(),
        };
        assert!(e.to_string().contains("section 3"));
        assert!(e.to_string().contains("connection reset"));
    }
}
