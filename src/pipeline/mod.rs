//! Pipeline stages for PDF-to-Docs conversion.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ layout ──▶ extract ──▶ group ──▶ write
//! (URL/path) (pdfium)  (Lines)   (Paragraphs) (batchUpdate)
//! ```
//!
//! 1. [`input`]: canonicalise the user-supplied path or URL to a local file
//! 2. [`layout`]: read positioned text spans; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`extract`]: filter boilerplate, classify and order lines
//! 4. [`group`]: merge adjacent same-style lines into paragraphs
//! 5. [`write`]: replace the document body in one atomic batch

pub mod extract;
pub mod group;
pub mod input;
pub mod layout;
pub mod write;
