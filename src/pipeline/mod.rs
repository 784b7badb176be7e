//! The summarization pipeline, stage by stage.
//!
//! A run moves through five stages:
//!
//! 1. **Acquiring** ([`input`]): resolve a path or URL to a local file.
//! 2. **Converting** ([`ocr`]): run the external OCR tool on PDFs;
//!    markup inputs skip this stage.
//! 3. **Splitting** ([`split`]): break the markup into header-scoped
//!    sections.
//! 4. **Summarizing** ([`section`], [`aggregate`]): stream each section's
//!    summary in document order, folding completed summaries into the
//!    combined document.
//! 5. **Synthesizing** ([`synthesis`]): stream the whole-document summary
//!    from the combined document.
//!
//! [`generate`] supplies the text-generation capability used by stages 4–5;
//! [`postprocess`] holds the text normalisation shared across stages.

pub mod aggregate;
pub mod generate;
pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod section;
pub mod split;
pub mod synthesis;
