//! Error types for the pdf2docs library.
//!
//! A single enum, [`Pdf2DocsError`], covers the three failure families of a
//! run:
//!
//! * **Extraction**: the input cannot be opened or parsed as a PDF. These
//!   abort the run before the remote document is touched.
//! * **Remote update**: the Docs API rejected the batch or the network call
//!   failed. Nothing is retried; the caller decides whether to run the whole
//!   extract-clear-insert sequence again.
//! * **Setup**: invalid configuration or missing credentials.
//!
//! [`Pdf2DocsError::EmptyDocument`] is special: the pipeline logs it as a
//! warning and skips the upload instead of returning it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2docs library.
#[derive(Debug, Error)]
pub enum Pdf2DocsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not read the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextLayerFailed { page: usize, detail: String },

    /// The PDF was readable but yielded no content after filtering.
    #[error("No extractable content in '{path}' after filtering boilerplate")]
    EmptyDocument { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, pass --pdfium-lib, or install\n\
libpdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Remote document errors ────────────────────────────────────────────
    /// No usable access token could be resolved.
    #[error("No Google Docs credentials available: {detail}")]
    CredentialsUnavailable { detail: String },

    /// The Docs API answered 401/403.
    #[error("Not authorised to edit document '{document_id}': {detail}")]
    Unauthorized { document_id: String, detail: String },

    /// The batch (or the read that precedes it) was rejected, or the network
    /// call failed before an answer arrived.
    #[error("Remote update of document '{document_id}' failed{}: {detail}", http_status(.status))]
    RemoteUpdateFailed {
        document_id: String,
        status: Option<u16>,
        detail: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A template profile file could not be read or parsed.
    #[error("Failed to load template profile '{path}': {detail}")]
    TemplateLoadFailed { path: PathBuf, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn http_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl Pdf2DocsError {
    /// `true` for errors raised while opening or reading the PDF.
    ///
    /// These are always raised before any remote mutation.
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            Pdf2DocsError::FileNotFound { .. }
                | Pdf2DocsError::PermissionDenied { .. }
                | Pdf2DocsError::DownloadFailed { .. }
                | Pdf2DocsError::DownloadTimeout { .. }
                | Pdf2DocsError::NotAPdf { .. }
                | Pdf2DocsError::CorruptPdf { .. }
                | Pdf2DocsError::PasswordRequired { .. }
                | Pdf2DocsError::WrongPassword { .. }
                | Pdf2DocsError::TextLayerFailed { .. }
                | Pdf2DocsError::PdfiumBindingFailed(_)
        )
    }

    /// `true` for errors reported by the remote document service.
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            Pdf2DocsError::Unauthorized { .. } | Pdf2DocsError::RemoteUpdateFailed { .. }
        )
    }
}
