//! Command-line interface for paperdigest.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use paperdigest::{
    convert_to_markup, summarize, summarize_to_file, SummaryConfig, SummaryProgressCallback,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "paperdigest",
    version,
    about = "Summarise scholarly documents section by section with streaming LLM output",
    long_about = "Converts a PDF (or existing markdown) to structured markup, splits it into \
                  header-scoped sections, summarises each section, and synthesises a final \
                  whole-paper summary.\n\nExamples:\n  paperdigest paper.pdf\n  paperdigest \
                  https://arxiv.org/pdf/1706.03762 -o attention.md\n  paperdigest paper.pdf \
                  --provider ollama --model llama3.2\n  paperdigest paper.pdf --convert-only \
                  -o paper.mmd"
)]
struct Cli {
    /// Input document: local PDF/markdown path or an http(s) URL
    input: String,

    /// Write the summary (or markup with --convert-only) to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model identifier, e.g. gpt-4o-mini or llama3.2
    #[arg(long, env = "PAPERDIGEST_MODEL")]
    model: Option<String>,

    /// Provider: openai, ollama, lmstudio, or an http(s):// base URL
    #[arg(long, env = "PAPERDIGEST_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature (0.0-2.0)
    #[arg(long, default_value_t = 0.3)]
    temperature: f32,

    /// Per-call generation cap, in tokens
    #[arg(long, default_value_t = 1024)]
    max_tokens: usize,

    /// Abort on the first failed section instead of skipping it
    #[arg(long)]
    fail_fast: bool,

    /// Exit with an error if any section failed
    #[arg(long)]
    strict: bool,

    /// Emit the full result as JSON instead of markdown
    #[arg(long)]
    json: bool,

    /// Stop after OCR conversion and output the raw markup
    #[arg(long)]
    convert_only: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// OCR command name or path
    #[arg(long, env = "PAPERDIGEST_OCR_COMMAND", default_value = "nougat")]
    ocr_command: String,

    /// OCR subprocess timeout, in seconds
    #[arg(long, default_value_t = 600)]
    ocr_timeout: u64,

    /// Document download timeout, in seconds
    #[arg(long, default_value_t = 120)]
    download_timeout: u64,

    /// Generation API request timeout, in seconds
    #[arg(long, default_value_t = 300)]
    api_timeout: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Progress bar driven by pipeline callbacks.
struct BarCallback {
    bar: ProgressBar,
}

impl BarCallback {
    fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl SummaryProgressCallback for BarCallback {
    fn on_run_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} sections {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn on_section_start(&self, index: usize, _total: usize) {
        self.bar.set_message(format!("summarising section {index}"));
    }

    fn on_section_complete(&self, _index: usize, _total: usize, _summary_len: usize) {
        self.bar.inc(1);
    }

    fn on_section_error(&self, index: usize, _total: usize, error: String) {
        self.bar.println(format!("section {index} failed: {error}"));
        self.bar.inc(1);
    }

    fn on_synthesis_start(&self) {
        self.bar.set_message("writing final synthesis".to_string());
    }

    fn on_run_complete(&self, total: usize, success_count: usize) {
        self.bar
            .finish_with_message(format!("{success_count}/{total} sections summarised"));
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("paperdigest={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .fail_fast(cli.fail_fast)
        .include_markup(cli.json)
        .ocr_command(cli.ocr_command.clone())
        .ocr_timeout_secs(cli.ocr_timeout)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);
    if let Some(model) = &cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(provider) = &cli.provider {
        builder = builder.provider(provider.clone());
    }
    if !cli.no_progress && !cli.json {
        builder = builder.progress_callback(Arc::new(BarCallback::new()));
    }
    builder.build().context("invalid configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let config = build_config(&cli)?;

    if cli.convert_only {
        let markup = convert_to_markup(&cli.input, &config)
            .await
            .with_context(|| format!("conversion of '{}' failed", cli.input))?;
        match &cli.output {
            Some(path) => {
                tokio::fs::write(path, &markup)
                    .await
                    .with_context(|| format!("failed to write '{}'", path.display()))?;
                eprintln!("markup written to {}", path.display());
            }
            None => print!("{markup}"),
        }
        return Ok(());
    }

    let summary = match &cli.output {
        Some(path) if !cli.json => summarize_to_file(&cli.input, path, &config).await,
        _ => summarize(&cli.input, &config).await,
    }
    .map_err(|e| anyhow::anyhow!("{e}").context(format!("failed during {}", e.stage())))?;

    if summary.has_failures() {
        eprintln!(
            "warning: {}/{} sections failed",
            summary.stats.failed_sections, summary.stats.total_sections
        );
    }

    if cli.json {
        let rendered = serde_json::to_string_pretty(&summary)?;
        match &cli.output {
            Some(path) => tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("failed to write '{}'", path.display()))?,
            None => println!("{rendered}"),
        }
    } else if cli.output.is_none() {
        print!("{}", summary.to_markdown());
    } else if let Some(path) = &cli.output {
        eprintln!("summary written to {}", path.display());
    }

    if cli.strict && summary.has_failures() {
        anyhow::bail!(
            "{}/{} sections failed (strict mode)",
            summary.stats.failed_sections,
            summary.stats.total_sections
        );
    }
    Ok(())
}
