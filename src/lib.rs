//! # paperdigest
//!
//! Section-aware summarization of scholarly documents with streaming output.
//!
//! A document (local PDF, download URL, or markup already in hand) is
//! converted to structured markup by an external OCR tool, split into
//! header-scoped sections, and summarized section by section through a
//! streaming text generator; the per-section summaries are then folded into
//! one combined document and synthesized into a final whole-paper summary.
//!
//! ```text
//! path / URL ──▶ acquire ──▶ OCR ──▶ split ──▶ summarize sections ──▶ synthesize
//!                          (nougat)  (#/##/###)  (one at a time,      (combined doc,
//!                                                 streamed)            streamed)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use paperdigest::SummaryConfig;
//!
//! # async fn demo() -> Result<(), paperdigest::DigestError> {
//! let config = SummaryConfig::builder()
//!     .provider("ollama")
//!     .model("llama3.2")
//!     .build()?;
//! let summary = paperdigest::summarize("paper.pdf", &config).await?;
//! println!("{}", summary.to_markdown());
//! # Ok(())
//! # }
//! ```
//!
//! For incremental display, use [`summarize_stream`] and consume
//! [`SummaryEvent`]s; each streamed snapshot extends the previous one.
//!
//! ## Feature flags
//!
//! | Feature | Default | Effect |
//! |---------|---------|--------|
//! | `cli`   | yes     | builds the `paperdigest` binary (clap, indicatif, anyhow, tracing-subscriber) |
//!
//! The library itself needs no feature flags; disable defaults for a
//! dependency-lean library build.

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod stream;
pub mod summarize;

pub use config::{SummaryConfig, SummaryConfigBuilder};
pub use error::{DigestError, SectionError, Stage};
pub use output::{DocumentSummary, SectionSummary, SummaryStats};
pub use pipeline::generate::{GenerationOptions, OpenAiGenerator, TextGenerator, TokenStream};
pub use pipeline::split::{split_sections, HeaderPath, Section, SectionSplitter};
pub use progress::{NoopProgressCallback, ProgressCallback, SummaryProgressCallback};
pub use stream::{summarize_markup_stream, summarize_stream, SummaryEvent, SummaryStream};
pub use summarize::{convert_to_markup, summarize, summarize_markup, summarize_to_file};
