//! Status-sink trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn StatusSink>`] via
//! [`crate::config::RenderConfigBuilder::status_sink`] to receive the
//! human-readable status line as the pipeline moves through its stages.
//!
//! # Why a sink instead of channels?
//!
//! The sink approach is the least-invasive integration point: callers can
//! forward the status to a terminal spinner, a WebSocket, or a DOM element in
//! a webview host, without the library knowing anything about how the host
//! application displays text. The trait is `Send + Sync` so it works when the
//! render runs on a multi-threaded runtime.
//!
//! Status is a single (text, severity) pair: each update overwrites the
//! previous one and no history is retained. Sinks that need history can
//! record it themselves, as [`LatestStatus`]'s test-oriented cousin in the
//! integration tests does.

use std::sync::{Arc, Mutex};

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// Receives the current pipeline status.
///
/// Implementations must be `Send + Sync`. The method has a default no-op
/// implementation so trivial sinks need no body at all.
///
/// # Ordering
///
/// Updates arrive in pipeline order: fetching, rendering, then a terminal
/// success or error line. Last write wins; the sink should replace, not
/// append.
pub trait StatusSink: Send + Sync {
    /// Called whenever the pipeline's status line changes.
    fn on_status(&self, text: &str, severity: Severity) {
        let _ = (text, severity);
    }
}

/// A no-op implementation for callers that don't display status.
///
/// This is the default when no sink is configured.
pub struct NoopStatusSink;

impl StatusSink for NoopStatusSink {}

/// A sink that retains only the most recent status, mirroring the
/// last-write-wins display contract.
#[derive(Default)]
pub struct LatestStatus {
    current: Mutex<Option<(String, Severity)>>,
}

impl LatestStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent (text, severity) pair, if any update has arrived.
    pub fn get(&self) -> Option<(String, Severity)> {
        self.current.lock().ok().and_then(|g| g.clone())
    }
}

impl StatusSink for LatestStatus {
    fn on_status(&self, text: &str, severity: Severity) {
        if let Ok(mut g) = self.current.lock() {
            *g = Some((text.to_string(), severity));
        }
    }
}

/// Convenience alias matching the type stored in [`crate::config::RenderConfig`].
pub type SharedStatusSink = Arc<dyn StatusSink>;
