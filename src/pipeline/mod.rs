//! Pipeline stages for DOCX-to-page rendering.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different conversion engine) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ convert ──▶ sanitize ──▶ toc
//! (bytes)   (engine)    (no scripts)  (anchors)
//! ```
//!
//! 1. [`fetch`]    — retrieve the document bytes from a path or URL, always
//!    bypassing HTTP caches
//! 2. [`crate::converter`] — hand the bytes to whichever engine is available;
//!    the only stage that can report the engine as missing
//! 3. [`dom`]      — owned HTML fragment tree the later stages mutate
//! 4. [`sanitize`] — strip script elements from the converted markup
//! 5. [`toc`]      — assign heading anchors and derive the table of contents

pub mod dom;
pub mod fetch;
pub mod sanitize;
pub mod toc;
