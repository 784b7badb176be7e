//! Progress reporting for summarization runs.
//!
//! Implement [`SummaryProgressCallback`] to observe a run as it happens:
//! per-section start/complete/error events plus synthesis and run-level
//! events. All methods have no-op defaults, so implementors override only
//! what they care about. The CLI uses this to drive an `indicatif` bar;
//! library users might log, update a UI, or feed a metrics pipeline.
//!
//! Callbacks are invoked from the pipeline task, so implementations must be
//! `Send + Sync` and should return quickly.

use std::sync::Arc;

/// Observer for pipeline progress events.
///
/// `index` is 1-based and `total` is the number of sections in the document.
pub trait SummaryProgressCallback: Send + Sync {
    /// Called once before the first section, after splitting.
    fn on_run_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a section's summary generation begins.
    fn on_section_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a section's summary has finished streaming.
    fn on_section_complete(&self, index: usize, total: usize, summary_len: usize) {
        let _ = (index, total, summary_len);
    }

    /// Called when a section fails (the run may still continue).
    ///
    /// The error is passed as a rendered string so the trait stays object
    /// safe and callbacks never borrow pipeline internals.
    fn on_section_error(&self, index: usize, total: usize, error: String) {
        let _ = (index, total, error);
    }

    /// Called when all sections are done and final synthesis begins.
    fn on_synthesis_start(&self) {}

    /// Called once when the run completes (after synthesis).
    fn on_run_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// Callback that ignores every event. Used when no callback is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressCallback;

impl SummaryProgressCallback for NoopProgressCallback {}

/// Shared handle to a progress callback.
pub type ProgressCallback = Arc<dyn SummaryProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        sections: AtomicUsize,
        errors: AtomicUsize,
    }

    impl SummaryProgressCallback for Counter {
        fn on_section_complete(&self, _index: usize, _total: usize, _summary_len: usize) {
            self.sections.fetch_add(1, Ordering::SeqCst);
        }

        fn on_section_error(&self, _index: usize, _total: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let cb = NoopProgressCallback;
        cb.on_run_start(3);
        cb.on_section_start(1, 3);
        cb.on_section_complete(1, 3, 42);
        cb.on_section_error(2, 3, "boom".into());
        cb.on_synthesis_start();
        cb.on_run_complete(3, 2);
    }

    #[test]
    fn overridden_methods_observe_events() {
        let cb = Counter::default();
        cb.on_run_start(2);
        cb.on_section_complete(1, 2, 10);
        cb.on_section_error(2, 2, "x".into());
        assert_eq!(cb.sections.load(Ordering::SeqCst), 1);
        assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_is_object_safe() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(1);
    }
}
