//! # pdf2docs
//!
//! Turn the text of a PDF into a styled Google Doc.
//!
//! Technical data sheets and similar template-driven PDFs carry their
//! structure in font size and weight rather than in tags. This crate reads
//! the positioned text with pdfium, decides which lines are headings, stitches
//! adjacent lines back into paragraphs, and replaces the body of a Google Doc
//! with the result in one atomic batch update.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Layout   positioned text spans via pdfium (spawn_blocking)
//!  ├─ 3. Extract  drop boilerplate, classify HEADING_1 / HEADING_2 / NORMAL_TEXT
//!  ├─ 4. Group    merge same-style lines closer than the paragraph gap
//!  └─ 5. Write    clear + insert + style in a single documents.batchUpdate
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2docs::{convert, ConversionConfig, DocumentTarget};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from PDF2DOCS_ACCESS_TOKEN or ./token.json
//!     let config = ConversionConfig::builder()
//!         .target(DocumentTarget::parse_existing(
//!             "https://docs.google.com/document/d/1AbC_dEf/edit",
//!         )?)
//!         .build()?;
//!     let output = convert("datasheet.pdf", &config).await?;
//!     eprintln!(
//!         "{} paragraphs ({} headings) written",
//!         output.stats.paragraphs, output.stats.headings
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2docs` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2docs = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod auth;
pub mod config;
pub mod convert;
pub mod docs;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

#[cfg(test)]
mod test_http;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, DocumentTarget, PageSelection, TemplateProfile,
};
pub use convert::{
    convert, convert_sync, extract_paragraphs, extract_paragraphs_with, paragraphs_from_layouts,
    upload,
};
pub use docs::{DocumentService, GoogleDocsClient};
pub use error::Pdf2DocsError;
pub use model::{Line, Paragraph, ParagraphStyle};
pub use output::{ConversionOutput, ConversionStats, WriteReport};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
