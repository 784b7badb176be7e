//! Streaming API: watch a summarization run as it happens.
//!
//! [`summarize_stream`] and [`summarize_markup_stream`] return a
//! [`SummaryStream`] of [`SummaryEvent`]s: growing snapshots of the combined
//! document while sections are summarized, growing snapshots of the final
//! synthesis, and a terminal [`SummaryEvent::Complete`] carrying the full
//! [`DocumentSummary`]. Every snapshot of the same value extends the
//! previous one, so consumers can re-render a display from the latest event
//! alone.
//!
//! The pipeline runs on a spawned task behind an mpsc channel. Dropping the
//! stream cancels the run: the task stops at its next event send, which also
//! drops any in-flight generation request.
//!
//! ```no_run
//! use futures::StreamExt;
//! use paperdigest::{SummaryConfig, SummaryEvent};
//!
//! # async fn demo() -> Result<(), paperdigest::DigestError> {
//! let config = SummaryConfig::builder().provider("ollama").model("llama3.2").build()?;
//! let mut stream = paperdigest::summarize_stream("paper.pdf", &config).await?;
//! while let Some(event) = stream.next().await {
//!     match event? {
//!         SummaryEvent::SectionProgress { combined, .. } => print!("\r{}", combined.len()),
//!         SummaryEvent::Complete(summary) => println!("\n{}", summary.synthesis),
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::SummaryConfig;
use crate::error::{DigestError, Stage};
use crate::output::{DocumentSummary, SummaryStats};
use crate::pipeline::generate::TextGenerator;
use crate::pipeline::input::{resolve_input, DocumentKind};
use crate::pipeline::split::{split_sections, Section};
use crate::pipeline::{aggregate, ocr, postprocess, synthesis};
use crate::summarize::resolve_generator;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, Sender};
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

/// An event observed during a summarization run.
#[derive(Debug, Clone)]
pub enum SummaryEvent {
    /// A section summary grew; `combined` is the full combined document so
    /// far including the in-progress section's partial summary.
    SectionProgress {
        index: usize,
        total: usize,
        combined: String,
    },
    /// A section finished (summarized, skipped, or failed); `combined` now
    /// holds exactly the headings and completed summaries of sections
    /// `1..=index`.
    SectionComplete {
        index: usize,
        total: usize,
        combined: String,
    },
    /// The final synthesis grew; `synthesis` is the full text so far.
    SynthesisProgress { synthesis: String },
    /// The run finished; this is always the last event.
    Complete(DocumentSummary),
}

/// Stream of run events. An `Err` item is fatal and ends the stream.
pub type SummaryStream = Pin<Box<dyn Stream<Item = Result<SummaryEvent, DigestError>> + Send>>;

/// Summarize a document (local path or URL), streaming events.
///
/// Acquisition and OCR conversion happen before this function returns, so
/// their failures surface as the function's own error; generation failures
/// arrive as stream items.
pub async fn summarize_stream(
    input: &str,
    config: &SummaryConfig,
) -> Result<SummaryStream, DigestError> {
    let run_started = Instant::now();
    let resolved = resolve_input(input, config.download_timeout_secs).await?;

    let convert_started = Instant::now();
    let markup = match resolved.kind() {
        DocumentKind::Pdf => ocr::convert_document(resolved.path(), config).await?,
        DocumentKind::Markup => tokio::fs::read_to_string(resolved.path())
            .await
            .map_err(|e| DigestError::Internal(format!("failed to read markup input: {e}")))?,
    };
    let convert_ms = match resolved.kind() {
        DocumentKind::Pdf => convert_started.elapsed().as_millis() as u64,
        DocumentKind::Markup => 0,
    };

    start_run(&markup, config, convert_ms, run_started)
}

/// Summarize markup directly, skipping acquisition and conversion.
pub async fn summarize_markup_stream(
    markup: &str,
    config: &SummaryConfig,
) -> Result<SummaryStream, DigestError> {
    start_run(markup, config, 0, Instant::now())
}

fn start_run(
    markup: &str,
    config: &SummaryConfig,
    convert_ms: u64,
    run_started: Instant,
) -> Result<SummaryStream, DigestError> {
    let sections: Vec<Section> = split_sections(markup).collect();
    if sections.is_empty() {
        return Err(DigestError::EmptyDocument);
    }
    let generator = resolve_generator(config)?;
    info!(sections = sections.len(), "starting summarization run");

    let stored_markup = config.include_markup.then(|| markup.to_string());
    let config = config.clone();
    let (tx, rx) = mpsc::channel::<Result<SummaryEvent, DigestError>>(32);
    tokio::spawn(async move {
        if let Err(e) =
            run_pipeline(&sections, generator, &config, stored_markup, convert_ms, run_started, &tx)
                .await
        {
            // Abandonment means nobody is listening; everything else is
            // surfaced as the stream's final item.
            let _ = tx.send(Err(e)).await;
        }
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
}

async fn run_pipeline(
    sections: &[Section],
    generator: Arc<dyn TextGenerator>,
    config: &SummaryConfig,
    markup: Option<String>,
    convert_ms: u64,
    run_started: Instant,
    events: &Sender<Result<SummaryEvent, DigestError>>,
) -> Result<(), DigestError> {
    let generation_started = Instant::now();
    let outcome = aggregate::run_sections(sections, generator.as_ref(), config, events).await?;

    if let Some(cb) = &config.progress_callback {
        cb.on_synthesis_start();
    }
    let mut synthesis_text = String::new();
    let mut stream = synthesis::open_synthesis_stream(generator.as_ref(), &outcome.combined, config).await?;
    while let Some(item) = stream.next().await {
        let chunk = item.map_err(|e| DigestError::GenerationFailed {
            stage: Stage::Synthesizing,
            detail: e.to_string(),
        })?;
        synthesis_text.push_str(&chunk);
        events
            .send(Ok(SummaryEvent::SynthesisProgress {
                synthesis: synthesis_text.clone(),
            }))
            .await
            .map_err(|_| {
                DigestError::Internal("summary stream abandoned by receiver".to_string())
            })?;
    }
    if synthesis_text.trim().is_empty() {
        return Err(DigestError::EmptyGeneration {
            stage: Stage::Synthesizing,
        });
    }

    let stats = SummaryStats {
        total_sections: outcome.sections.len(),
        summarized_sections: outcome.summarized,
        failed_sections: outcome.failed,
        skipped_sections: outcome.skipped,
        convert_duration_ms: convert_ms,
        generation_duration_ms: generation_started.elapsed().as_millis() as u64,
        total_duration_ms: run_started.elapsed().as_millis() as u64,
    };
    if let Some(cb) = &config.progress_callback {
        cb.on_run_complete(stats.total_sections, stats.summarized_sections);
    }
    info!(
        sections = stats.total_sections,
        failed = stats.failed_sections,
        total_ms = stats.total_duration_ms,
        "summarization run complete"
    );

    let summary = DocumentSummary {
        markup,
        combined: outcome.combined,
        // Cleanup applies to the stored value only; streamed snapshots stay
        // exactly as generated so they remain prefix-extensions.
        synthesis: postprocess::clean_generated(&synthesis_text),
        sections: outcome.sections,
        stats,
    };
    events
        .send(Ok(SummaryEvent::Complete(summary)))
        .await
        .map_err(|_| DigestError::Internal("summary stream abandoned by receiver".to_string()))?;
    Ok(())
}
