//! Fetch stage: retrieve the document bytes from a path or URL.
//!
//! ## Why bypass the cache?
//!
//! The document can be republished at any time under the same URL, so every
//! render asks the origin for fresh bytes (`Cache-Control: no-store`) rather
//! than trusting an intermediary's copy. A single attempt is made per render;
//! retry policy belongs to the caller, not here.
//!
//! We validate the DOCX container magic (`PK\x03\x04`) before returning so
//! callers get a meaningful error rather than an engine failure on garbage
//! bytes.

use crate::error::RenderError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Check if the source string looks like a URL.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch document bytes from a local path or HTTP/HTTPS URL.
///
/// # Errors
/// Non-success HTTP status, network failure, and timeout all surface as
/// fetch-stage errors; a payload without the DOCX container magic surfaces as
/// [`RenderError::NotADocx`].
pub async fn fetch_bytes(source: &str, timeout_secs: u64) -> Result<Vec<u8>, RenderError> {
    let bytes = if is_url(source) {
        fetch_url(source, timeout_secs).await?
    } else {
        read_local(source)?
    };

    if bytes.len() < 4 || &bytes[..4] != b"PK\x03\x04" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(RenderError::NotADocx {
            source: source.to_string(),
            magic,
        });
    }

    Ok(bytes)
}

/// Read a local file, distinguishing missing from unreadable.
fn read_local(path_str: &str) -> Result<Vec<u8>, RenderError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(RenderError::FileNotFound { path });
    }

    match std::fs::read(&path) {
        Ok(bytes) => {
            debug!("Read local document: {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(RenderError::PermissionDenied { path })
        }
        Err(_) => Err(RenderError::FileNotFound { path }),
    }
}

/// Fetch a URL with cache bypass, single attempt.
async fn fetch_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, RenderError> {
    info!("Fetching document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RenderError::FetchFailed {
            source: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .header(reqwest::header::CACHE_CONTROL, "no-store")
        .header(reqwest::header::PRAGMA, "no-cache")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                RenderError::FetchTimeout {
                    source: url.to_string(),
                    secs: timeout_secs,
                }
            } else {
                RenderError::FetchFailed {
                    source: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

    if !response.status().is_success() {
        return Err(RenderError::FetchFailed {
            source: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            RenderError::FetchTimeout {
                source: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            RenderError::FetchFailed {
                source: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    debug!("Fetched {} bytes", bytes.len());
    Ok(bytes.to_vec())
}
