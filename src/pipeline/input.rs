//! Input resolution: local paths and download URLs.
//!
//! Accepts either a filesystem path or an `http(s)://` URL. URLs are
//! downloaded to a temporary directory that lives as long as the returned
//! [`ResolvedInput`]. The resolved document is sniffed for the `%PDF` magic
//! to decide whether OCR conversion is needed or the file is already markup.

use crate::error::DigestError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// What kind of document a resolved input holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A PDF; needs OCR conversion.
    Pdf,
    /// Already markup (markdown/MMD); conversion is skipped.
    Markup,
}

/// A resolved, locally readable input document.
///
/// Downloaded variants own their temp directory; the file is removed when
/// the value is dropped.
pub enum ResolvedInput {
    Local {
        path: PathBuf,
        kind: DocumentKind,
    },
    Downloaded {
        path: PathBuf,
        kind: DocumentKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    /// Path to the local file.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } | ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    /// Detected document kind.
    pub fn kind(&self) -> DocumentKind {
        match self {
            ResolvedInput::Local { kind, .. } | ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }
}

impl std::fmt::Debug for ResolvedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedInput")
            .field("path", &self.path())
            .field("kind", &self.kind())
            .field("downloaded", &matches!(self, ResolvedInput::Downloaded { .. }))
            .finish()
    }
}

/// True when `input` looks like a download URL rather than a path.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve `input` (path or URL) to a local file, downloading if needed.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, DigestError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(Path::new(input)).await
    }
}

async fn resolve_local(path: &Path) -> Result<ResolvedInput, DigestError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(DigestError::InvalidInput {
                input: path.display().to_string(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DigestError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => {
            return Err(DigestError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    }

    let kind = detect_kind(path).await?;
    debug!(path = %path.display(), ?kind, "resolved local input");
    Ok(ResolvedInput::Local {
        path: path.to_path_buf(),
        kind,
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, DigestError> {
    info!(url, "downloading document");
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DigestError::Internal(format!("failed to build HTTP client: {e}")))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DigestError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DigestError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DigestError::DownloadFailed {
            url: url.to_string(),
            reason: format!("server returned {status}"),
        });
    }

    let bytes = response.bytes().await.map_err(|e| DigestError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let temp_dir = TempDir::new().map_err(|e| {
        DigestError::Internal(format!("failed to create download directory: {e}"))
    })?;
    let path = temp_dir.path().join(extract_filename(url));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| DigestError::Internal(format!("failed to store download: {e}")))?;

    let kind = detect_kind(&path).await?;
    info!(path = %path.display(), bytes = bytes.len(), ?kind, "download complete");
    Ok(ResolvedInput::Downloaded {
        path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// Last path segment of the URL, or a generic fallback name.
fn extract_filename(url: &str) -> String {
    url.split('?')
        .next()
        .and_then(|u| u.rsplit('/').next())
        .filter(|name| !name.is_empty() && *name != "http:" && *name != "https:")
        .map(str::to_string)
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}

/// Sniff the file's leading bytes for the `%PDF` magic.
async fn detect_kind(path: &Path) -> Result<DocumentKind, DigestError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DigestError::Internal(format!("failed to read '{}': {e}", path.display())))?;
    if bytes.starts_with(b"%PDF") {
        Ok(DocumentKind::Pdf)
    } else {
        Ok(DocumentKind::Markup)
    }
}
