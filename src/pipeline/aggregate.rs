//! Section Aggregator: the sequential driver of the summarization run.
//!
//! Owns the combined summary document and processes sections strictly in
//! document order, one at a time. For each section it appends the
//! reconstructed heading, streams the section summary, and emits growing
//! snapshots of the combined document over the event channel. At each
//! section's completion the combined document is exactly the concatenation
//! of heading + summary for all completed sections so far.
//!
//! Failure policy: a failed section keeps its heading, loses any partial
//! summary text, gets its error recorded, and the run continues, unless
//! `fail_fast` is set, in which case the run aborts. If every attempted
//! section fails, the run fails with `AllSectionsFailed`.

use crate::config::SummaryConfig;
use crate::error::{DigestError, SectionError};
use crate::output::SectionSummary;
use crate::pipeline::generate::TextGenerator;
use crate::pipeline::section::open_section_stream;
use crate::pipeline::split::Section;
use crate::stream::SummaryEvent;
use futures::StreamExt;
use std::time::Instant;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};

/// What the aggregator produced after driving all sections.
pub struct AggregateOutcome {
    /// The completed combined summary document.
    pub combined: String,
    /// Per-section results, in document order.
    pub sections: Vec<SectionSummary>,
    /// Sections that produced a summary.
    pub summarized: usize,
    /// Sections that failed.
    pub failed: usize,
    /// Sections skipped for having no body.
    pub skipped: usize,
}

/// Drive all sections sequentially, sending snapshots over `events`.
pub async fn run_sections(
    sections: &[Section],
    generator: &dyn TextGenerator,
    config: &SummaryConfig,
    events: &Sender<Result<SummaryEvent, DigestError>>,
) -> Result<AggregateOutcome, DigestError> {
    let total = sections.len();
    let mut combined = String::new();
    let mut results: Vec<SectionSummary> = Vec::with_capacity(total);
    let mut summarized = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;
    let mut first_error: Option<String> = None;

    if let Some(cb) = &config.progress_callback {
        cb.on_run_start(total);
    }

    for section in sections {
        let index = section.index;
        let heading = section.header_path.heading();
        if let Some(h) = &heading {
            combined.push('\n');
            combined.push_str(h);
            combined.push('\n');
        }

        if section.body.trim().is_empty() {
            debug!(section = index, "section has no body, skipping generation");
            skipped += 1;
            results.push(SectionSummary {
                index,
                heading,
                header_path: section.header_path.clone(),
                summary: String::new(),
                duration_ms: 0,
                skipped: true,
                error: None,
            });
            send(events, SummaryEvent::SectionComplete {
                index,
                total,
                combined: combined.clone(),
            })
            .await?;
            continue;
        }

        if let Some(cb) = &config.progress_callback {
            cb.on_section_start(index, total);
        }
        let started = Instant::now();
        // Summary text is rebuilt onto the combined document from this
        // offset after every chunk, so snapshots only ever extend.
        let base_len = combined.len();
        let mut summary = String::new();
        let mut error: Option<SectionError> = None;

        match open_section_stream(generator, section, config).await {
            Err(e) => {
                error = Some(SectionError::GenerationFailed {
                    index,
                    detail: e.to_string(),
                });
            }
            Ok(mut stream) => {
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(chunk) => {
                            summary.push_str(&chunk);
                            combined.truncate(base_len);
                            combined.push_str(&summary);
                            send(events, SummaryEvent::SectionProgress {
                                index,
                                total,
                                combined: combined.clone(),
                            })
                            .await?;
                        }
                        Err(e) => {
                            error = Some(SectionError::GenerationFailed {
                                index,
                                detail: e.to_string(),
                            });
                            break;
                        }
                    }
                }
                if error.is_none() && summary.trim().is_empty() {
                    error = Some(SectionError::EmptySummary { index });
                }
            }
        }

        let duration_ms = started.elapsed().as_millis() as u64;

        if let Some(err) = error {
            // Drop any partial summary text; the heading stays.
            combined.truncate(base_len);
            failed += 1;
            warn!(section = index, error = %err, "section summarization failed");
            if first_error.is_none() {
                first_error = Some(err.to_string());
            }
            if let Some(cb) = &config.progress_callback {
                cb.on_section_error(index, total, err.to_string());
            }
            if config.fail_fast {
                return Err(DigestError::SectionAborted {
                    index,
                    detail: err.to_string(),
                });
            }
            results.push(SectionSummary {
                index,
                heading,
                header_path: section.header_path.clone(),
                summary: String::new(),
                duration_ms,
                skipped: false,
                error: Some(err),
            });
        } else {
            summarized += 1;
            debug!(section = index, chars = summary.len(), "section summary complete");
            if let Some(cb) = &config.progress_callback {
                cb.on_section_complete(index, total, summary.len());
            }
            results.push(SectionSummary {
                index,
                heading,
                header_path: section.header_path.clone(),
                summary,
                duration_ms,
                skipped: false,
                error: None,
            });
        }

        send(events, SummaryEvent::SectionComplete {
            index,
            total,
            combined: combined.clone(),
        })
        .await?;
    }

    let attempted = total - skipped;
    if attempted > 0 && failed == attempted {
        return Err(DigestError::AllSectionsFailed {
            total: attempted,
            first_error: first_error.unwrap_or_else(|| "unknown".to_string()),
        });
    }

    info!(total, summarized, failed, skipped, "all sections processed");
    Ok(AggregateOutcome {
        combined,
        sections: results,
        summarized,
        failed,
        skipped,
    })
}

/// Send an event, treating a dropped receiver as run abandonment.
async fn send(
    events: &Sender<Result<SummaryEvent, DigestError>>,
    event: SummaryEvent,
) -> Result<(), DigestError> {
    events
        .send(Ok(event))
        .await
        .map_err(|_| DigestError::Internal("summary stream abandoned by receiver".to_string()))
}
