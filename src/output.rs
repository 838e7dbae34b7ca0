//! Output types: the result of a render pass and its page-facing view.
//!
//! [`RenderOutput`] is the library-facing result — structured HTML, TOC
//! entries, diagnostics, and timing stats. [`PageView`] is the host-facing
//! projection: the three strings a page actually displays (content surface,
//! TOC surface, status line), including the fallback form used when the
//! render fails. Keeping the projection separate means a failed render still
//! yields something displayable without the caller touching [`RenderError`]
//! internals.

use crate::converter::Diagnostic;
use crate::error::RenderError;
use crate::pipeline::toc::{self, TocEntry};
use crate::status::Severity;
use serde::{Deserialize, Serialize};

/// Timing and size statistics for one render pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderStats {
    /// Size of the fetched document in bytes.
    pub fetched_bytes: usize,
    /// Milliseconds spent fetching the document.
    pub fetch_ms: u64,
    /// Milliseconds spent in the conversion engine.
    pub convert_ms: u64,
    /// Milliseconds for the whole pass, poll wait included.
    pub total_ms: u64,
    /// Warning-severity diagnostics reported by the converter.
    pub warning_count: usize,
}

/// The full result of a successful render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Sanitized HTML fragment with heading anchors assigned.
    pub content_html: String,
    /// Table-of-contents entries in document order.
    pub toc: Vec<TocEntry>,
    /// Converter diagnostics, in emission order.
    pub diagnostics: Vec<Diagnostic>,
    /// Timing and size statistics.
    pub stats: RenderStats,
}

impl RenderOutput {
    /// The terminal status line for this output.
    pub fn status_text(&self) -> String {
        if self.stats.warning_count > 0 {
            format!(
                "Loaded (with {} formatting warning(s)).",
                self.stats.warning_count
            )
        } else {
            "Loaded successfully.".to_string()
        }
    }
}

/// What the page displays: content surface, TOC surface, and status line.
///
/// Produced for every render, failed or not; [`crate::render_page`] never
/// returns an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    /// Markup for the content surface.
    pub content_html: String,
    /// Markup for the TOC surface.
    pub toc_html: String,
    /// Final status line text.
    pub status: String,
    /// Severity of the status line.
    pub severity: Severity,
}

impl PageView {
    /// Project a successful render into its displayable form.
    pub fn from_output(output: &RenderOutput) -> Self {
        Self {
            content_html: output.content_html.clone(),
            toc_html: toc::render_toc_html(&output.toc),
            status: output.status_text(),
            severity: Severity::Info,
        }
    }

    /// The fallback page for a failed render: explanatory content, an
    /// unavailable-TOC placeholder, and an error-severity status.
    pub fn failure(error: &RenderError) -> Self {
        Self {
            content_html: format!(
                r#"<p class="render-fallback">{}</p>"#,
                error.fallback_text()
            ),
            toc_html: toc::toc_unavailable_html(),
            status: error.status_text().to_string(),
            severity: Severity::Error,
        }
    }
}
