//! Configuration types for DOCX-to-page rendering.
//!
//! All render behaviour is controlled through [`RenderConfig`], built via its
//! [`RenderConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across threads and to diff two runs to understand why
//! their outputs differ.
//!
//! # Design choice: builder over constructor
//! A multi-field constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults for
//! the rest.

use crate::converter::{ConverterRegistry, HtmlConverter};
use crate::error::RenderError;
use crate::status::StatusSink;
use std::fmt;
use std::sync::Arc;

/// Configuration for one document render.
///
/// Built via [`RenderConfig::builder()`] or [`RenderConfig::default()`].
///
/// # Example
/// ```rust
/// use docx2page::RenderConfig;
///
/// let config = RenderConfig::builder()
///     .fetch_timeout_secs(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RenderConfig {
    /// Interval between converter-availability polls, in milliseconds. Default: 50.
    ///
    /// The engine may be registered by the host at any time after startup, so
    /// the pipeline polls rather than failing on the first miss.
    pub poll_interval_ms: u64,

    /// Maximum number of availability polls before giving up. Default: 60.
    ///
    /// With the default interval the total wait is bounded at about 3
    /// seconds, after which the render fails with
    /// [`RenderError::ConverterUnavailable`] rather than hanging.
    pub poll_max_attempts: u32,

    /// Fetch timeout for URL sources in seconds. Default: 30.
    pub fetch_timeout_secs: u64,

    /// Pre-constructed conversion engine. Takes precedence over the registry,
    /// skipping availability polling entirely. Useful in tests or when the
    /// caller constructs the engine itself.
    pub converter: Option<Arc<dyn HtmlConverter>>,

    /// Registry to poll when no `converter` is set. `None` means the
    /// process-wide [`ConverterRegistry::global`].
    pub registry: Option<Arc<ConverterRegistry>>,

    /// Receives the pipeline's status line as it changes. `None` means no
    /// status reporting.
    pub status_sink: Option<Arc<dyn StatusSink>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            poll_max_attempts: 60,
            fetch_timeout_secs: 30,
            converter: None,
            registry: None,
            status_sink: None,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field(
                "converter",
                &self.converter.as_ref().map(|_| "<dyn HtmlConverter>"),
            )
            .field(
                "registry",
                &self.registry.as_ref().map(|_| "<ConverterRegistry>"),
            )
            .field(
                "status_sink",
                &self.status_sink.as_ref().map(|_| "<dyn StatusSink>"),
            )
            .finish()
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms.max(1);
        self
    }

    pub fn poll_max_attempts(mut self, n: u32) -> Self {
        self.config.poll_max_attempts = n.max(1);
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn converter(mut self, converter: Arc<dyn HtmlConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    pub fn registry(mut self, registry: Arc<ConverterRegistry>) -> Self {
        self.config.registry = Some(registry);
        self
    }

    pub fn status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.config.status_sink = Some(sink);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, RenderError> {
        let c = &self.config;
        if c.poll_interval_ms == 0 {
            return Err(RenderError::InvalidConfig(
                "Poll interval must be ≥ 1ms".into(),
            ));
        }
        if c.poll_max_attempts == 0 {
            return Err(RenderError::InvalidConfig(
                "Poll attempts must be ≥ 1".into(),
            ));
        }
        if c.fetch_timeout_secs == 0 {
            return Err(RenderError::InvalidConfig(
                "Fetch timeout must be ≥ 1s".into(),
            ));
        }
        Ok(self.config)
    }
}
