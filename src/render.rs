//! Render entry points: drive the full fetch → convert → sanitize → TOC pass.
//!
//! ## Two boundaries
//!
//! [`render`] is the library boundary: it returns `Err(RenderError)` on any
//! fatal failure so programmatic callers can branch on the cause.
//! [`render_page`] is the display boundary: it never fails, converting any
//! error into a fallback [`PageView`] with an explanatory content block, an
//! unavailable-TOC placeholder, and an error-severity status — the page keeps
//! working even when this pipeline fails entirely.

use crate::config::RenderConfig;
use crate::converter::{ConverterRegistry, HtmlConverter};
use crate::error::RenderError;
use crate::output::{PageView, RenderOutput, RenderStats};
use crate::pipeline::{dom::Fragment, fetch, sanitize, toc};
use crate::status::Severity;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

fn set_status(config: &RenderConfig, text: &str, severity: Severity) {
    if let Some(ref sink) = config.status_sink {
        sink.on_status(text, severity);
    }
}

/// Render a DOCX file or URL into sanitized HTML plus a table of contents.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `source` — Local file path or HTTP/HTTPS URL to a DOCX document
/// * `config` — Render configuration
///
/// # Returns
/// `Ok(RenderOutput)` on success, even if the converter reported formatting
/// warnings (check `output.stats.warning_count`).
///
/// # Errors
/// Returns `Err(RenderError)` for fatal failures only:
/// - No converter engine became available within the poll window
/// - The document could not be fetched, or is not a DOCX
/// - The conversion itself failed
pub async fn render(
    source: impl AsRef<str>,
    config: &RenderConfig,
) -> Result<RenderOutput, RenderError> {
    let result = render_inner(source.as_ref(), config).await;
    if let Err(ref e) = result {
        set_status(config, e.status_text(), Severity::Error);
    }
    result
}

async fn render_inner(source: &str, config: &RenderConfig) -> Result<RenderOutput, RenderError> {
    let total_start = Instant::now();
    info!("Starting render: {}", source);

    // ── Step 1: Wait for a converter engine ──────────────────────────────
    // The engine may still be loading when the render starts, so this runs
    // before any fetch: if no engine ever appears, no bytes are wasted.
    let engine = resolve_converter(config).await?;
    debug!("Using converter engine: {}", engine.name());

    // ── Step 2: Fetch the document ───────────────────────────────────────
    set_status(config, "Fetching document…", Severity::Info);
    let fetch_start = Instant::now();
    let bytes = fetch::fetch_bytes(source, config.fetch_timeout_secs).await?;
    let fetch_ms = fetch_start.elapsed().as_millis() as u64;
    info!("Fetched {} bytes in {}ms", bytes.len(), fetch_ms);

    // ── Step 3: Convert to HTML ──────────────────────────────────────────
    set_status(config, "Rendering document…", Severity::Info);
    let convert_start = Instant::now();
    let result = engine
        .convert(&bytes)
        .await
        .map_err(|detail| RenderError::ConversionFailed { detail })?;
    let convert_ms = convert_start.elapsed().as_millis() as u64;
    info!(
        "Converted in {}ms ({} diagnostic(s))",
        convert_ms,
        result.diagnostics.len()
    );

    // ── Step 4: Sanitize ─────────────────────────────────────────────────
    // Unconditional, even for the bundled engine.
    let mut fragment = Fragment::parse(&result.html);
    sanitize::strip_scripts(&mut fragment);

    // ── Step 5: Build the table of contents ──────────────────────────────
    let entries = toc::build_toc(&mut fragment);
    debug!("TOC has {} entr(ies)", entries.len());

    // ── Step 6: Assemble output and final status ─────────────────────────
    let stats = RenderStats {
        fetched_bytes: bytes.len(),
        fetch_ms,
        convert_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
        warning_count: result.warning_count(),
    };

    let output = RenderOutput {
        content_html: fragment.to_html(),
        toc: entries,
        diagnostics: result.diagnostics,
        stats,
    };

    set_status(config, &output.status_text(), Severity::Info);
    info!("Render complete in {}ms", output.stats.total_ms);

    Ok(output)
}

/// Render for display: always produces a [`PageView`], never an error.
///
/// Failures become the fallback page; the status sink sees the same error
/// status the view carries.
pub async fn render_page(source: impl AsRef<str>, config: &RenderConfig) -> PageView {
    match render(source, config).await {
        Ok(output) => PageView::from_output(&output),
        Err(e) => {
            info!("Render failed, producing fallback page: {}", e);
            PageView::failure(&e)
        }
    }
}

/// Render and write the content HTML to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn render_to_file(
    source: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<RenderOutput, RenderError> {
    let output = render(source, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RenderError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("html.tmp");
    tokio::fs::write(&tmp_path, &output.content_html)
        .await
        .map_err(|e| RenderError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| RenderError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output)
}

/// Synchronous wrapper around [`render`].
///
/// Creates a temporary tokio runtime internally.
pub fn render_sync(
    source: impl AsRef<str>,
    config: &RenderConfig,
) -> Result<RenderOutput, RenderError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RenderError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(render(source, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the conversion engine, from most-specific to least-specific.
///
/// 1. **Pre-built engine** (`config.converter`) — the caller constructed the
///    engine itself; no polling at all. Useful in tests or when the caller
///    wraps an engine with middleware.
///
/// 2. **Configured registry** (`config.registry`) — polled on the configured
///    interval. Lets tests use an isolated registry.
///
/// 3. **Global registry** — the process-wide default, populated by
///    [`crate::register_bundled_converter`] or by the host application.
async fn resolve_converter(
    config: &RenderConfig,
) -> Result<Arc<dyn HtmlConverter>, RenderError> {
    if let Some(ref engine) = config.converter {
        return Ok(Arc::clone(engine));
    }

    let registry = match config.registry {
        Some(ref r) => r.as_ref(),
        None => ConverterRegistry::global(),
    };

    registry
        .wait(
            Duration::from_millis(config.poll_interval_ms),
            config.poll_max_attempts,
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConversionResult, Diagnostic};
    use async_trait::async_trait;

    struct FixedConverter {
        html: &'static str,
        warnings: usize,
    }

    #[async_trait]
    impl HtmlConverter for FixedConverter {
        async fn convert(&self, _bytes: &[u8]) -> Result<ConversionResult, String> {
            Ok(ConversionResult {
                html: self.html.to_string(),
                diagnostics: (0..self.warnings)
                    .map(|i| Diagnostic::warning(format!("w{i}")))
                    .collect(),
            })
        }
    }

    struct FailingConverter;

    #[async_trait]
    impl HtmlConverter for FailingConverter {
        async fn convert(&self, _bytes: &[u8]) -> Result<ConversionResult, String> {
            Err("corrupt body".to_string())
        }
    }

    fn docx_fixture(dir: &tempfile::TempDir) -> String {
        use std::io::Write;
        let path = dir.path().join("doc.docx");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"PK\x03\x04 fixture container").unwrap();
        path.to_str().unwrap().to_string()
    }

    fn config_with(engine: Arc<dyn HtmlConverter>) -> RenderConfig {
        RenderConfig::builder().converter(engine).build().unwrap()
    }

    #[tokio::test]
    async fn happy_path_builds_toc_and_sanitizes() {
        let dir = tempfile::tempdir().unwrap();
        let source = docx_fixture(&dir);
        let config = config_with(Arc::new(FixedConverter {
            html: "<h1>Intro</h1><script>x()</script><p>body</p>",
            warnings: 0,
        }));

        let output = render(&source, &config).await.unwrap();
        assert!(!output.content_html.contains("script"));
        assert_eq!(output.toc.len(), 1);
        assert_eq!(output.toc[0].id, "intro");
        assert_eq!(output.status_text(), "Loaded successfully.");
    }

    #[tokio::test]
    async fn warnings_counted_in_status() {
        let dir = tempfile::tempdir().unwrap();
        let source = docx_fixture(&dir);
        let config = config_with(Arc::new(FixedConverter {
            html: "<p>x</p>",
            warnings: 2,
        }));

        let output = render(&source, &config).await.unwrap();
        assert_eq!(
            output.status_text(),
            "Loaded (with 2 formatting warning(s))."
        );
    }

    #[tokio::test]
    async fn conversion_failure_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let source = docx_fixture(&dir);
        let config = config_with(Arc::new(FailingConverter));

        let err = render(&source, &config).await.unwrap_err();
        match err {
            RenderError::ConversionFailed { detail } => assert_eq!(detail, "corrupt body"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unavailable_converter_skips_fetch() {
        // Source does not exist: if the pipeline tried to fetch first, the
        // error would be FileNotFound instead.
        let registry = Arc::new(ConverterRegistry::new());
        let config = RenderConfig::builder()
            .registry(registry)
            .poll_interval_ms(1)
            .poll_max_attempts(3)
            .build()
            .unwrap();

        let err = render("/nope/missing.docx", &config).await.unwrap_err();
        assert!(matches!(err, RenderError::ConverterUnavailable { .. }));
    }

    #[tokio::test]
    async fn render_page_never_fails() {
        let config = config_with(Arc::new(FixedConverter {
            html: "<p>x</p>",
            warnings: 0,
        }));
        let view = render_page("/nope/missing.docx", &config).await;
        assert_eq!(view.severity, Severity::Error);
        assert!(view.toc_html.contains("TOC unavailable."));
    }

    #[tokio::test]
    async fn render_to_file_writes_content() {
        let dir = tempfile::tempdir().unwrap();
        let source = docx_fixture(&dir);
        let out_path = dir.path().join("out/page.html");
        let config = config_with(Arc::new(FixedConverter {
            html: "<h1>Saved</h1>",
            warnings: 0,
        }));

        render_to_file(&source, &out_path, &config).await.unwrap();
        let written = std::fs::read_to_string(&out_path).unwrap();
        assert!(written.contains("<h1 id=\"saved\">Saved</h1>"));
    }
}
