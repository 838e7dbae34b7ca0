//! Error types for the docx2page library.
//!
//! Two distinct severities reflect two distinct failure modes:
//!
//! * [`RenderError`] — **Fatal**: the render cannot produce document content
//!   (document unreachable, payload not a DOCX, no converter engine
//!   available). Returned as `Err(RenderError)` from the `render*` functions;
//!   [`crate::render_page`] turns it into a fallback page instead.
//!
//! * [`crate::Diagnostic`] — **Non-fatal**: the converter flagged something in
//!   the document (an unsupported style, a skipped image) but the conversion
//!   as a whole succeeded. Stored inside [`crate::ConversionResult`] so
//!   callers can report "loaded with N warning(s)" rather than losing the
//!   whole page to one odd paragraph.
//!
//! The separation lets callers decide their own tolerance: treat any warning
//! as failure, surface a count, or ignore diagnostics entirely.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docx2page library.
///
/// Formatting-level issues use [`crate::Diagnostic`] and are stored in
/// [`crate::ConversionResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum RenderError {
    // ── Fetch errors ──────────────────────────────────────────────────────
    /// Local document file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid source '{source}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidSource { r#source: String },

    /// The document could not be fetched (network failure or non-2xx status).
    ///
    /// A single attempt is made; there is no retry.
    #[error("Failed to fetch '{source}': {reason}\nCheck the URL and your connection.")]
    FetchFailed { r#source: String, reason: String },

    /// Fetch exceeded the configured timeout.
    #[error("Fetch timed out after {secs}s for '{source}'\nIncrease --fetch-timeout.")]
    FetchTimeout { r#source: String, secs: u64 },

    /// The payload was fetched, but is not a DOCX container.
    #[error("Source is not a valid DOCX: '{source}'\nFirst bytes: {magic:?}")]
    NotADocx { r#source: String, magic: [u8; 4] },

    // ── Converter errors ──────────────────────────────────────────────────
    /// No converter engine became available within the polling window.
    ///
    /// Distinct from [`RenderError::ConversionFailed`]: here the engine never
    /// showed up, so no conversion was attempted at all.
    #[error(
        "No DOCX converter is available (waited {waited_ms}ms).\n\
         Register an engine with register_bundled_converter() or provide one via the config."
    )]
    ConverterUnavailable { waited_ms: u64 },

    /// The converter engine was available but the conversion itself failed.
    #[error("DOCX conversion failed: {detail}")]
    ConversionFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RenderError {
    /// Short status line shown to end users when this error aborts a render.
    ///
    /// Fetch-stage failures and conversion-stage failures get different
    /// wording so the user knows whether the document never arrived or
    /// arrived and could not be read.
    pub fn status_text(&self) -> &'static str {
        match self {
            RenderError::FileNotFound { .. }
            | RenderError::PermissionDenied { .. }
            | RenderError::InvalidSource { .. }
            | RenderError::FetchFailed { .. }
            | RenderError::FetchTimeout { .. } => "Error: could not load the document.",
            RenderError::NotADocx { .. } | RenderError::ConversionFailed { .. } => {
                "Error: failed to render the document."
            }
            RenderError::ConverterUnavailable { .. } => {
                "Error: document converter failed to load."
            }
            RenderError::OutputWriteFailed { .. }
            | RenderError::InvalidConfig(_)
            | RenderError::Internal(_) => "Error: failed to render the document.",
        }
    }

    /// Longer explanation rendered into the fallback page body.
    pub fn fallback_text(&self) -> String {
        match self {
            RenderError::FileNotFound { .. }
            | RenderError::PermissionDenied { .. }
            | RenderError::InvalidSource { .. }
            | RenderError::FetchFailed { .. }
            | RenderError::FetchTimeout { .. } => {
                "The document could not be downloaded. Please try again later.".to_string()
            }
            RenderError::ConverterUnavailable { .. } => {
                "The document viewer failed to load. Please refresh and try again.".to_string()
            }
            _ => "The document could not be displayed. Please try again later.".to_string(),
        }
    }
}
