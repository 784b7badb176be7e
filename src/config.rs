//! Configuration for summarization runs.
//!
//! [`SummaryConfig`] collects everything a run needs: which text generator to
//! use (explicit handle, named provider, or environment fallback), generation
//! parameters, OCR command settings, timeouts, and an optional progress
//! callback. Build one with [`SummaryConfig::builder`]; `Default` gives
//! sensible values for local experimentation.

use crate::error::DigestError;
use crate::pipeline::generate::TextGenerator;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Default sampling temperature for summary generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default per-call generation cap, in tokens.
pub const DEFAULT_MAX_TOKENS: usize = 1024;
/// Default section-body budget, in characters, before truncation.
pub const DEFAULT_CONTEXT_BUDGET: usize = 24_000;
/// Default OCR subprocess timeout.
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 600;
/// Default document download timeout.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;
/// Default per-request generation API timeout.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Settings for a summarization run.
#[derive(Clone)]
pub struct SummaryConfig {
    /// Model identifier passed to the generator (e.g. `gpt-4o-mini`).
    pub model: Option<String>,
    /// Named provider for generator resolution (`openai`, `ollama`,
    /// `lmstudio`, or an `http(s)://` base URL).
    pub provider_name: Option<String>,
    /// Explicit generator handle; takes precedence over any resolution.
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Sampling temperature, clamped to 0.0–2.0.
    pub temperature: f32,
    /// Per-call generation cap, in tokens.
    pub max_tokens: usize,
    /// Maximum section-body length, in characters, before truncation.
    pub context_budget: usize,
    /// Override for the built-in section-summary prompt template.
    pub section_prompt: Option<String>,
    /// Override for the built-in final-synthesis prompt template.
    pub synthesis_prompt: Option<String>,
    /// Abort the run on the first failed section instead of skipping it.
    pub fail_fast: bool,
    /// Keep the intermediate markup in the result.
    pub include_markup: bool,
    /// OCR command name or path.
    pub ocr_command: String,
    /// Extra arguments passed to the OCR command before the input path.
    pub ocr_args: Vec<String>,
    /// OCR subprocess timeout, in seconds.
    pub ocr_timeout_secs: u64,
    /// Document download timeout, in seconds.
    pub download_timeout_secs: u64,
    /// Generation API request timeout, in seconds.
    pub api_timeout_secs: u64,
    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            generator: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            context_budget: DEFAULT_CONTEXT_BUDGET,
            section_prompt: None,
            synthesis_prompt: None,
            fail_fast: false,
            include_markup: false,
            ocr_command: "nougat".to_string(),
            ocr_args: Vec::new(),
            ocr_timeout_secs: DEFAULT_OCR_TIMEOUT_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("generator", &self.generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("context_budget", &self.context_budget)
            .field("fail_fast", &self.fail_fast)
            .field("include_markup", &self.include_markup)
            .field("ocr_command", &self.ocr_command)
            .field("ocr_args", &self.ocr_args)
            .field("ocr_timeout_secs", &self.ocr_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SummaryProgressCallback>"),
            )
            .finish()
    }
}

impl SummaryConfig {
    /// Start building a config.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder::default()
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Default)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    /// Model identifier passed to the generator.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    /// Named provider (`openai`, `ollama`, `lmstudio`, or a base URL).
    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    /// Explicit generator handle; skips provider resolution entirely.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    /// Sampling temperature. Values outside 0.0–2.0 are clamped.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Per-call generation cap, in tokens.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Maximum section-body length, in characters, before truncation.
    pub fn context_budget(mut self, chars: usize) -> Self {
        self.config.context_budget = chars;
        self
    }

    /// Override the section-summary prompt template. Must contain the
    /// `{headers}` and `{content}` placeholders.
    pub fn section_prompt(mut self, template: impl Into<String>) -> Self {
        self.config.section_prompt = Some(template.into());
        self
    }

    /// Override the final-synthesis prompt template. Must contain the
    /// `{docs}` placeholder.
    pub fn synthesis_prompt(mut self, template: impl Into<String>) -> Self {
        self.config.synthesis_prompt = Some(template.into());
        self
    }

    /// Abort on the first failed section instead of skipping it.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// Keep the intermediate markup in the result.
    pub fn include_markup(mut self, include: bool) -> Self {
        self.config.include_markup = include;
        self
    }

    /// OCR command name or path (default `nougat`).
    pub fn ocr_command(mut self, command: impl Into<String>) -> Self {
        self.config.ocr_command = command.into();
        self
    }

    /// Extra arguments for the OCR command.
    pub fn ocr_args(mut self, args: Vec<String>) -> Self {
        self.config.ocr_args = args;
        self
    }

    /// OCR subprocess timeout, in seconds.
    pub fn ocr_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ocr_timeout_secs = secs;
        self
    }

    /// Document download timeout, in seconds.
    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Generation API request timeout, in seconds.
    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Register a progress observer.
    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Validate and produce the config.
    pub fn build(self) -> Result<SummaryConfig, DigestError> {
        if self.config.max_tokens == 0 {
            return Err(DigestError::InvalidConfig(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        if self.config.context_budget < 512 {
            return Err(DigestError::InvalidConfig(format!(
                "context_budget of {} chars is too small to hold a section (minimum 512)",
                self.config.context_budget
            )));
        }
        if self.config.ocr_command.trim().is_empty() {
            return Err(DigestError::InvalidConfig(
                "ocr_command must not be empty".to_string(),
            ));
        }
        Ok(self.config)
    }
}
