//! Converter adapter: the narrow seam between the pipeline and whatever
//! engine turns DOCX bytes into HTML.
//!
//! ## Why a registry with polling?
//!
//! The conversion capability is provided by an engine the host application
//! loads on its own schedule, so it is not guaranteed to exist at the moment
//! a render starts. [`ConverterRegistry::wait`] polls for a registered engine
//! on a fixed interval for a bounded number of attempts and fails with
//! [`RenderError::ConverterUnavailable`] if nothing shows up — never silently
//! proceeding, and distinctly from a conversion-time failure.
//!
//! Callers that construct their own engine (tests especially) can skip the
//! registry entirely by setting [`crate::config::RenderConfig::converter`];
//! the pipeline then performs no polling at all.

use crate::error::RenderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;
use tracing::debug;

/// Severity of a [`Diagnostic`] emitted during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Document content was altered or skipped; counts toward the
    /// "loaded with N warning(s)" status.
    Warning,
    /// Informational only; does not affect the final status line.
    Info,
}

/// A non-fatal message produced while converting a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Info,
            message: message.into(),
        }
    }
}

/// Output of one conversion: an HTML fragment plus ordered diagnostics.
///
/// Immutable once produced; owned by the rendering flow for the duration of
/// one render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The converted HTML fragment. May be empty for an empty document.
    pub html: String,
    /// Diagnostics in the order the converter emitted them.
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionResult {
    /// Number of warning-severity diagnostics, as surfaced in the final
    /// status line.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .count()
    }
}

/// The conversion capability: DOCX bytes in, HTML fragment out.
///
/// Single method so the pipeline has no compile-time dependency on any
/// specific engine; a test double can implement it synchronously.
#[async_trait]
pub trait HtmlConverter: Send + Sync {
    /// Convert DOCX bytes to HTML.
    ///
    /// # Errors
    /// Returns the engine's failure detail as a string; the pipeline wraps it
    /// in [`RenderError::ConversionFailed`].
    async fn convert(&self, bytes: &[u8]) -> Result<ConversionResult, String>;

    /// Engine name for logging.
    fn name(&self) -> &str {
        "converter"
    }
}

/// Holds the (at most one) registered conversion engine.
///
/// The process-wide registry from [`ConverterRegistry::global`] models an
/// engine arriving at an unpredictable time; a local registry is useful in
/// tests that must not observe another test's registration.
#[derive(Default)]
pub struct ConverterRegistry {
    engine: RwLock<Option<Arc<dyn HtmlConverter>>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by default.
    pub fn global() -> &'static ConverterRegistry {
        static GLOBAL: OnceLock<ConverterRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ConverterRegistry::new)
    }

    /// Register (or replace) the conversion engine.
    pub fn register(&self, engine: Arc<dyn HtmlConverter>) {
        debug!("Registering converter engine: {}", engine.name());
        if let Ok(mut slot) = self.engine.write() {
            *slot = Some(engine);
        }
    }

    /// The currently registered engine, if any. Does not wait.
    pub fn get(&self) -> Option<Arc<dyn HtmlConverter>> {
        self.engine.read().ok().and_then(|g| g.clone())
    }

    /// Poll until an engine is registered.
    ///
    /// Checks immediately, then sleeps `interval` between attempts, up to
    /// `max_attempts` sleeps. With the defaults (50ms, 60 attempts) the total
    /// wait is bounded at about 3 seconds.
    ///
    /// # Errors
    /// [`RenderError::ConverterUnavailable`] when no engine appeared within
    /// the window.
    pub async fn wait(
        &self,
        interval: Duration,
        max_attempts: u32,
    ) -> Result<Arc<dyn HtmlConverter>, RenderError> {
        for attempt in 0..max_attempts {
            if let Some(engine) = self.get() {
                if attempt > 0 {
                    debug!("Converter engine appeared after {} poll(s)", attempt);
                }
                return Ok(engine);
            }
            tokio::time::sleep(interval).await;
        }

        // Last chance after the final sleep.
        if let Some(engine) = self.get() {
            return Ok(engine);
        }

        Err(RenderError::ConverterUnavailable {
            waited_ms: interval.as_millis() as u64 * max_attempts as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl std::fmt::Debug for dyn HtmlConverter {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.name())
        }
    }

    struct EchoConverter;

    #[async_trait]
    impl HtmlConverter for EchoConverter {
        async fn convert(&self, bytes: &[u8]) -> Result<ConversionResult, String> {
            Ok(ConversionResult {
                html: format!("<p>{} bytes</p>", bytes.len()),
                diagnostics: vec![Diagnostic::warning("style skipped")],
            })
        }
    }

    #[test]
    fn warning_count_ignores_info() {
        let result = ConversionResult {
            html: String::new(),
            diagnostics: vec![
                Diagnostic::warning("a"),
                Diagnostic::info("b"),
                Diagnostic::warning("c"),
            ],
        };
        assert_eq!(result.warning_count(), 2);
    }

    #[tokio::test]
    async fn wait_returns_registered_engine_immediately() {
        let registry = ConverterRegistry::new();
        registry.register(Arc::new(EchoConverter));

        let engine = registry
            .wait(Duration::from_millis(1), 3)
            .await
            .expect("engine is registered");
        let result = engine.convert(b"abcd").await.unwrap();
        assert_eq!(result.html, "<p>4 bytes</p>");
    }

    #[tokio::test]
    async fn wait_times_out_on_empty_registry() {
        let registry = ConverterRegistry::new();
        let err = registry
            .wait(Duration::from_millis(1), 5)
            .await
            .expect_err("no engine was registered");
        match err {
            RenderError::ConverterUnavailable { waited_ms } => assert_eq!(waited_ms, 5),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn wait_picks_up_late_registration() {
        let registry = Arc::new(ConverterRegistry::new());

        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.wait(Duration::from_millis(5), 60).await })
        };

        tokio::time::sleep(Duration::from_millis(15)).await;
        registry.register(Arc::new(EchoConverter));

        let engine = waiter.await.unwrap().expect("engine arrived in time");
        assert_eq!(engine.name(), "converter");
    }
}
