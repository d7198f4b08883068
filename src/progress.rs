//! Progress-callback trait for stage-boundary events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves from extraction to grouping to upload. The
//! CLI renders them as a spinner plus one line per stage; library callers
//! can forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use pdf2docs::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_grouping_complete(&self, paragraphs: usize) {
//!         eprintln!("{paragraphs} paragraphs");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline at every stage boundary.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in pipeline order from a single task.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the input is resolved.
    fn on_conversion_start(&self, input: &str) {
        let _ = input;
    }

    /// Called after every selected page has been read and filtered.
    ///
    /// # Arguments
    /// * `pages`   : pages walked
    /// * `lines`   : lines kept
    /// * `filtered`: lines dropped as boilerplate
    fn on_extraction_complete(&self, pages: usize, lines: usize, filtered: usize) {
        let _ = (pages, lines, filtered);
    }

    /// Called after lines have been merged into paragraphs.
    fn on_grouping_complete(&self, paragraphs: usize) {
        let _ = paragraphs;
    }

    /// Called just before the batch is sent.
    ///
    /// # Arguments
    /// * `document_id`: target document
    /// * `requests`   : number of edit operations in the batch
    fn on_upload_start(&self, document_id: &str, requests: usize) {
        let _ = (document_id, requests);
    }

    /// Called after the service accepted the batch.
    ///
    /// # Arguments
    /// * `document_id`   : target document
    /// * `inserted_units`: UTF-16 code units inserted
    fn on_upload_complete(&self, document_id: &str, inserted_units: usize) {
        let _ = (document_id, inserted_units);
    }

    /// Called when the upload was skipped (dry run or nothing extracted).
    fn on_upload_skipped(&self, reason: &str) {
        let _ = reason;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
