//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline against pdfium and the Google Docs
//! API. The pieces are also exposed separately so callers (and tests) can
//! stop after extraction, bring their own [`LayoutSource`], or write through
//! their own [`DocumentService`]:
//!
//! ```text
//! extract_paragraphs_with ──▶ paragraphs_from_layouts ──▶ upload
//!   (input + layout)            (extract + group)          (write)
//! ```
//!
//! Extraction always finishes before anything remote is touched, so an
//! unreadable PDF never leaves the target document half-cleared.

use crate::auth;
use crate::config::{ConversionConfig, DocumentTarget};
use crate::docs::{DocumentService, GoogleDocsClient};
use crate::error::Pdf2DocsError;
use crate::output::ConversionOutput;
use crate::pipeline::extract::{extract_lines, LineClassifier};
use crate::pipeline::group::group_lines;
use crate::pipeline::input;
use crate::pipeline::layout::{LayoutSource, PageLayout, PdfiumLayout};
use crate::pipeline::write::{render_text, DocumentWriter};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Convert a PDF file or URL and write it into the configured document.
///
/// # Errors
/// Extraction errors, missing credentials, or a rejected batch. An input
/// that yields no text is not an error: the upload is skipped and the
/// returned output has no [`ConversionOutput::write`] report.
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2DocsError> {
    let total_start = Instant::now();
    if config.target.is_none() {
        return Err(no_target());
    }
    let mut output = extract_paragraphs(input_str, config).await?;

    if output.paragraphs.is_empty() {
        skip_upload(config, "nothing to insert");
    } else {
        let http = reqwest::Client::new();
        let token = auth::resolve_access_token(&http, &config.credentials_path).await?;
        let client = GoogleDocsClient::new(http, &config.api_base_url, token);
        upload(&client, &mut output, config).await?;
    }

    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} paragraphs ({} headings), {}ms total",
        output.stats.paragraphs, output.stats.headings, output.stats.total_duration_ms
    );
    Ok(output)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2DocsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2DocsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

/// Extract and group paragraphs with pdfium, without any remote call.
pub async fn extract_paragraphs(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2DocsError> {
    let source = PdfiumLayout::new(config.pdfium_library_path.clone());
    extract_paragraphs_with(input_str, config, source).await
}

/// [`extract_paragraphs`] over any [`LayoutSource`].
pub async fn extract_paragraphs_with<L>(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
    source: L,
) -> Result<ConversionOutput, Pdf2DocsError>
where
    L: LayoutSource + 'static,
{
    let start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(input_str);
    }

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();
    let pages = load_layouts(source, pdf_path.clone(), config).await?;
    drop(resolved);

    let mut output = paragraphs_from_layouts(&pages, config)?;
    output.stats.extract_duration_ms = start.elapsed().as_millis() as u64;

    if output.paragraphs.is_empty() {
        warn!("{}", Pdf2DocsError::EmptyDocument { path: pdf_path });
    }
    Ok(output)
}

/// Read the selected pages on the blocking pool.
async fn load_layouts<L>(
    source: L,
    pdf_path: PathBuf,
    config: &ConversionConfig,
) -> Result<Vec<PageLayout>, Pdf2DocsError>
where
    L: LayoutSource + 'static,
{
    let password = config.password.clone();
    let selection = config.pages.clone();

    tokio::task::spawn_blocking(move || {
        source.page_layouts(&pdf_path, password.as_deref(), &selection)
    })
    .await
    .map_err(|e| Pdf2DocsError::Internal(format!("Layout task panicked: {}", e)))?
}

/// Filter, classify and group the lines of already-read pages.
pub fn paragraphs_from_layouts(
    pages: &[PageLayout],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2DocsError> {
    let classifier = LineClassifier::from_config(config)?;
    let extracted = extract_lines(pages, &classifier);
    info!(
        "Extracted {} lines from {} pages ({} boilerplate lines dropped)",
        extracted.lines.len(),
        extracted.pages,
        extracted.filtered
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(extracted.pages, extracted.lines.len(), extracted.filtered);
    }

    let paragraphs = group_lines(&extracted.lines, config.paragraph_gap);
    info!("Grouped into {} paragraphs", paragraphs.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_grouping_complete(paragraphs.len());
    }

    let mut output = ConversionOutput {
        text: render_text(&paragraphs),
        ..ConversionOutput::default()
    };
    output.stats.pages = extracted.pages;
    output.stats.lines = extracted.lines.len();
    output.stats.filtered_lines = extracted.filtered;
    output.stats.count_paragraphs(&paragraphs);
    output.paragraphs = paragraphs;
    Ok(output)
}

/// Write `output.paragraphs` into the configured target through `service`.
///
/// Creates the document first for [`DocumentTarget::New`]. Does nothing
/// (besides logging) when there are no paragraphs.
pub async fn upload<S: DocumentService>(
    service: &S,
    output: &mut ConversionOutput,
    config: &ConversionConfig,
) -> Result<(), Pdf2DocsError> {
    if output.paragraphs.is_empty() {
        skip_upload(config, "nothing to insert");
        return Ok(());
    }

    let target = config.target.as_ref().ok_or_else(no_target)?;

    let start = Instant::now();
    let document_id = match target {
        DocumentTarget::Existing(id) => id.clone(),
        DocumentTarget::New { title } => {
            let created = service.create_document(title).await?;
            info!("Created document {:?} ({})", title, created.document_id);
            created.document_id
        }
    };

    let (report, _plan) = DocumentWriter::new(service)
        .apply_styles(config.apply_styles)
        .require_revision(config.require_revision)
        .progress(config.progress_callback.clone())
        .replace_content(&document_id, &output.paragraphs)
        .await?;

    output.stats.upload_duration_ms = start.elapsed().as_millis() as u64;
    output.document_id = Some(document_id);
    output.write = Some(report);
    Ok(())
}

fn no_target() -> Pdf2DocsError {
    Pdf2DocsError::InvalidConfig(
        "no target document: set a document id or ask for a new document".into(),
    )
}

fn skip_upload(config: &ConversionConfig, reason: &str) {
    info!("Skipping upload: {}", reason);
    if let Some(ref cb) = config.progress_callback {
        cb.on_upload_skipped(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParagraphStyle;
    use crate::pipeline::layout::{TextBlock, TextLine, TextSpan};

    fn page(index: usize, blocks: Vec<(f32, &str, f32)>) -> PageLayout {
        PageLayout {
            index,
            blocks: blocks
                .into_iter()
                .map(|(top, text, size)| TextBlock {
                    top,
                    lines: vec![TextLine::new(vec![TextSpan::new(text, size, "Helvetica")])],
                })
                .collect(),
        }
    }

    #[test]
    fn layouts_become_paragraphs_and_stats() {
        let pages = vec![page(
            0,
            vec![
                (10.0, "Description", 16.0),
                (11.0, "Our product is durable.", 10.0),
                (40.0, "Physical Data", 16.0),
            ],
        )];
        let output = paragraphs_from_layouts(&pages, &ConversionConfig::default()).unwrap();

        assert_eq!(
            output.paragraphs,
            vec![
                crate::model::Paragraph::new("Description", ParagraphStyle::Heading1),
                crate::model::Paragraph::new("Our product is durable.", ParagraphStyle::NormalText),
                crate::model::Paragraph::new("Physical Data", ParagraphStyle::Heading1),
            ]
        );
        assert_eq!(output.text, "DESCRIPTION\nOur product is durable.\nPHYSICAL DATA\n");
        assert_eq!(output.stats.pages, 1);
        assert_eq!(output.stats.lines, 3);
        assert_eq!(output.stats.headings, 2);
        assert!(output.document_id.is_none());
    }

    #[test]
    fn no_pages_gives_empty_output() {
        let output = paragraphs_from_layouts(&[], &ConversionConfig::default()).unwrap();
        assert!(output.paragraphs.is_empty());
        assert!(output.text.is_empty());
    }
}
