//! # docx2page
//!
//! Render DOCX documents into sanitized HTML fragments with a generated
//! table of contents.
//!
//! ## Why this crate?
//!
//! Displaying a Word document on a page involves more than one conversion
//! call: the converter engine may not be loaded yet, the document has to be
//! fetched cache-free, the converted markup must be sanitized before use, and
//! navigation anchors have to be derived from the headings. This crate wires
//! those steps into one pipeline with well-defined failure modes, so a failed
//! render degrades into an explanatory fallback page instead of a blank
//! surface or an unhandled error.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DOCX
//!  │
//!  ├─ 1. Wait     poll for a registered converter engine (50ms × 60)
//!  ├─ 2. Fetch    local file or URL, cache bypassed, single attempt
//!  ├─ 3. Convert  DOCX bytes → HTML fragment + diagnostics
//!  ├─ 4. Sanitize strip script elements at any depth, unconditionally
//!  ├─ 5. TOC      anchor h1/h2 headings, derive navigation entries
//!  └─ 6. Status   "Loaded successfully." / "Loaded (with N …warning(s))."
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx2page::{render, register_bundled_converter, RenderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     register_bundled_converter();
//!     let config = RenderConfig::default();
//!     let output = render("document.docx", &config).await?;
//!     println!("{}", output.content_html);
//!     eprintln!("{} TOC entries, {} warning(s)",
//!         output.toc.len(),
//!         output.stats.warning_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `docx2page` binary (clap + anyhow + tracing-subscriber) |
//! | `bundled` | on      | Ships the built-in `docx-engine` converter |
//!
//! Disable both when embedding the pipeline with your own engine:
//! ```toml
//! docx2page = { version = "0.3", default-features = false }
//! ```
//!
//! ## Bring your own engine
//!
//! The pipeline talks to its converter through the [`HtmlConverter`] trait
//! and finds it via a [`ConverterRegistry`] it polls for up to ~3 seconds,
//! mirroring an engine that loads on its own schedule. Register yours with
//! [`ConverterRegistry::global`], or hand it straight to the config via
//! [`config::RenderConfigBuilder::converter`] to skip polling.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod converter;
#[cfg(feature = "bundled")]
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod status;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RenderConfig, RenderConfigBuilder};
pub use converter::{
    ConversionResult, ConverterRegistry, Diagnostic, DiagnosticSeverity, HtmlConverter,
};
#[cfg(feature = "bundled")]
pub use engine::{register_bundled_converter, BundledConverter};
pub use error::RenderError;
pub use output::{PageView, RenderOutput, RenderStats};
pub use pipeline::toc::TocEntry;
pub use render::{render, render_page, render_sync, render_to_file};
pub use status::{LatestStatus, NoopStatusSink, Severity, SharedStatusSink, StatusSink};
