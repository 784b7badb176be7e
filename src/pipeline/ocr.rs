//! OCR conversion: PDF to structured markup via an external tool.
//!
//! Shells out to a nougat-style OCR command that writes a `.mmd` file named
//! after the input's stem into an output directory. The subprocess runs
//! under a timeout; its stdout/stderr are captured for diagnostics. The
//! resulting markup gets its math delimiters normalised before being handed
//! to the splitter.

use crate::config::SummaryConfig;
use crate::error::DigestError;
use crate::pipeline::postprocess;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Convert the PDF at `pdf_path` to markup using the configured OCR command.
pub async fn convert_document(
    pdf_path: &Path,
    config: &SummaryConfig,
) -> Result<String, DigestError> {
    let out_dir = tempfile::tempdir()
        .map_err(|e| DigestError::Internal(format!("failed to create OCR output dir: {e}")))?;

    let mut command = Command::new(&config.ocr_command);
    command
        .arg("--out")
        .arg(out_dir.path())
        .args(&config.ocr_args)
        .arg(pdf_path)
        .arg("--markdown")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    info!(
        command = %config.ocr_command,
        input = %pdf_path.display(),
        "starting OCR conversion"
    );

    let run = command.output();
    let output = match tokio::time::timeout(Duration::from_secs(config.ocr_timeout_secs), run).await
    {
        Err(_) => {
            return Err(DigestError::OcrTimeout {
                path: pdf_path.to_path_buf(),
                secs: config.ocr_timeout_secs,
            })
        }
        Ok(Err(e)) => {
            return Err(DigestError::OcrLaunchFailed {
                command: config.ocr_command.clone(),
                reason: e.to_string(),
            })
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DigestError::OcrFailed {
            status: output.status.to_string(),
            stderr: stderr.chars().take(2000).collect(),
        });
    }

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let mmd_path = out_dir.path().join(format!("{stem}.mmd"));

    let raw = match tokio::fs::read_to_string(&mmd_path).await {
        Ok(content) => content,
        Err(_) => {
            warn!(expected = %mmd_path.display(), "OCR exited cleanly but produced no markup");
            return Err(DigestError::OcrOutputMissing { path: mmd_path });
        }
    };

    debug!(chars = raw.len(), "OCR conversion complete");
    Ok(postprocess::normalise_math_delimiters(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_command(command: &str) -> SummaryConfig {
        SummaryConfig {
            ocr_command: command.to_string(),
            ocr_timeout_secs: 10,
            ..SummaryConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_command_is_launch_failure() {
        let config = config_with_command("definitely-not-a-real-ocr-command");
        let err = convert_document(Path::new("paper.pdf"), &config).await.unwrap_err();
        assert!(matches!(err, DigestError::OcrLaunchFailed { .. }));
        assert_eq!(err.stage(), crate::error::Stage::Converting);
    }

    #[tokio::test]
    async fn failing_command_reports_status_and_stderr() {
        // `false` exits 1 with no output on every Unix.
        let config = config_with_command("false");
        let err = convert_document(Path::new("paper.pdf"), &config).await.unwrap_err();
        assert!(matches!(err, DigestError::OcrFailed { .. }));
    }

    #[tokio::test]
    async fn clean_exit_without_output_file_is_missing_output() {
        // `true` exits 0 but writes nothing.
        let config = config_with_command("true");
        let err = convert_document(Path::new("paper.pdf"), &config).await.unwrap_err();
        assert!(matches!(err, DigestError::OcrOutputMissing { .. }));
    }
}
