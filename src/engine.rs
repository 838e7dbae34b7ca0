//! Bundled conversion engine: adapts `docx-engine` to the converter seam.
//!
//! Built only with the `bundled` feature. Hosts that bring their own engine
//! compile without this module and register their converter directly.

use crate::converter::{ConversionResult, ConverterRegistry, Diagnostic, HtmlConverter};
use async_trait::async_trait;
use docx_engine::{EngineMessage, MessageKind};
use std::sync::Arc;

/// [`HtmlConverter`] backed by the in-process `docx-engine` crate.
pub struct BundledConverter;

#[async_trait]
impl HtmlConverter for BundledConverter {
    async fn convert(&self, bytes: &[u8]) -> Result<ConversionResult, String> {
        // The engine parses the whole archive synchronously; keep it off the
        // async worker threads.
        let bytes = bytes.to_vec();
        let output = tokio::task::spawn_blocking(move || docx_engine::convert(&bytes))
            .await
            .map_err(|e| format!("conversion task panicked: {e}"))?
            .map_err(|e| e.to_string())?;

        Ok(ConversionResult {
            html: output.html,
            diagnostics: output.messages.iter().map(to_diagnostic).collect(),
        })
    }

    fn name(&self) -> &str {
        "docx-engine"
    }
}

fn to_diagnostic(message: &EngineMessage) -> Diagnostic {
    match message.kind {
        MessageKind::Warning => Diagnostic::warning(&message.text),
        MessageKind::Info => Diagnostic::info(&message.text),
    }
}

/// Register the bundled engine with the global [`ConverterRegistry`].
///
/// Idempotent; a later registration simply replaces the earlier one.
pub fn register_bundled_converter() {
    ConverterRegistry::global().register(Arc::new(BundledConverter));
}
