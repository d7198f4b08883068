//! Page layout: the text of a PDF as pages → blocks → lines → spans.
//!
//! The extractor never talks to pdfium directly; it consumes
//! [`PageLayout`]s produced by a [`LayoutSource`]. [`PdfiumLayout`] is the
//! production source. Tests build layouts by hand.
//!
//! ## How pdfium text becomes blocks
//!
//! pdfium reports text as *segments*: runs of characters that share a
//! baseline and font. We
//!
//! 1. take each segment's bounds and the font of its first character,
//! 2. join segments whose vertical extents overlap into one [`TextLine`]
//!    (each segment becomes a [`TextSpan`]),
//! 3. start a new [`TextBlock`] whenever the gap above a line exceeds
//!    [`BLOCK_LINE_MARGIN`] of the previous line's height.
//!
//! Coordinates are flipped to top-down so that a smaller `top` is higher on
//! the page.

use crate::config::PageSelection;
use crate::error::Pdf2DocsError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fraction of the previous line's height that the gap between two lines may
/// reach before they are put into different blocks.
pub const BLOCK_LINE_MARGIN: f32 = 0.5;

/// A run of text sharing one font within a line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Font size in points.
    pub font_size: f32,
    pub font_name: String,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, font_size: f32, font_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_name: font_name.into(),
        }
    }
}

/// One visual line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// Span texts joined with single spaces, leading/trailing whitespace
    /// removed.
    pub fn joined_text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Consecutive lines that belong together on the page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    /// Top edge in points from the top of the page.
    pub top: f32,
    pub lines: Vec<TextLine>,
}

/// All text blocks of one page, in the order the PDF reports them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    /// 0-based page index.
    pub index: usize,
    pub blocks: Vec<TextBlock>,
}

/// Produces page layouts for a PDF file.
pub trait LayoutSource: Send + Sync {
    /// Read the pages of `pdf_path` picked by `selection`, in page order.
    ///
    /// Any failure aborts the whole read; there is no partial-page result.
    fn page_layouts(
        &self,
        pdf_path: &Path,
        password: Option<&str>,
        selection: &PageSelection,
    ) -> Result<Vec<PageLayout>, Pdf2DocsError>;
}

/// 0-based indices of the selected pages of a `total_pages` document.
///
/// An explicit selection that matches no page is a configuration error.
pub fn select_pages(
    selection: &PageSelection,
    total_pages: usize,
) -> Result<Vec<usize>, Pdf2DocsError> {
    let indices = selection.to_indices(total_pages);
    if indices.is_empty() && !matches!(selection, PageSelection::All) {
        return Err(Pdf2DocsError::InvalidConfig(format!(
            "page selection {selection:?} matches none of the {total_pages} pages"
        )));
    }
    if indices.len() < total_pages {
        debug!("Selected {} of {} pages", indices.len(), total_pages);
    }
    Ok(indices)
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// [`LayoutSource`] backed by the pdfium shared library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumLayout {
    library_path: Option<PathBuf>,
}

impl PdfiumLayout {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    fn bind(&self) -> Result<Pdfium, Pdf2DocsError> {
        bind_pdfium(self.library_path.as_deref())
    }
}

/// Bind to pdfium: an explicit path first, then `PDFIUM_LIB_PATH`, then the
/// system loader, then a library next to the working directory.
pub fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, Pdf2DocsError> {
    let explicit = library_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => {
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(&path).map_err(|e| {
                Pdf2DocsError::PdfiumBindingFailed(format!("{}: {e}", path.display()))
            })?
        }
        None => Pdfium::bind_to_system_library()
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            })
            .map_err(|e| Pdf2DocsError::PdfiumBindingFailed(e.to_string()))?,
    };

    Ok(Pdfium::new(bindings))
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2DocsError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2DocsError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2DocsError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2DocsError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

impl LayoutSource for PdfiumLayout {
    fn page_layouts(
        &self,
        pdf_path: &Path,
        password: Option<&str>,
        selection: &PageSelection,
    ) -> Result<Vec<PageLayout>, Pdf2DocsError> {
        let pdfium = self.bind()?;
        let document = open_document(&pdfium, pdf_path, password)?;
        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let indices = select_pages(selection, total_pages)?;

        let mut layouts = Vec::with_capacity(indices.len());
        for idx in indices {
            let page = pages
                .get(idx as u16)
                .map_err(|e| Pdf2DocsError::TextLayerFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let layout = read_page(&page, idx)?;
            debug!(
                "Page {}: {} blocks, {} lines",
                idx + 1,
                layout.blocks.len(),
                layout.blocks.iter().map(|b| b.lines.len()).sum::<usize>()
            );
            layouts.push(layout);
        }

        Ok(layouts)
    }
}

/// A positioned span before it is assigned to a line.
#[derive(Debug, Clone)]
struct PlacedSpan {
    span: TextSpan,
    top: f32,
    bottom: f32,
}

fn read_page(page: &PdfPage, index: usize) -> Result<PageLayout, Pdf2DocsError> {
    let page_height = page.height().value;
    let text = page.text().map_err(|e| Pdf2DocsError::TextLayerFailed {
        page: index + 1,
        detail: format!("{:?}", e),
    })?;

    let mut spans = Vec::new();
    for segment in text.segments().iter() {
        let content = segment.text();
        if content.trim().is_empty() {
            continue;
        }

        let (font_size, font_name) = segment
            .chars()
            .ok()
            .and_then(|chars| {
                chars
                    .iter()
                    .find(|c| c.unicode_char().is_some_and(|ch| !ch.is_whitespace()))
                    .map(|c| (c.scaled_font_size().value, c.font_name()))
            })
            .unwrap_or((0.0, String::new()));

        let bounds = segment.bounds();
        spans.push(PlacedSpan {
            span: TextSpan::new(content, font_size, font_name),
            top: page_height - bounds.top().value,
            bottom: page_height - bounds.bottom().value,
        });
    }

    Ok(PageLayout {
        index,
        blocks: build_blocks(spans),
    })
}

/// Assemble positioned spans (in pdfium order) into lines and blocks.
fn build_blocks(spans: Vec<PlacedSpan>) -> Vec<TextBlock> {
    // (top, bottom, line)
    let mut lines: Vec<(f32, f32, TextLine)> = Vec::new();
    for placed in spans {
        match lines.last_mut() {
            Some((top, bottom, line)) if overlaps(*top, *bottom, placed.top, placed.bottom) => {
                *top = top.min(placed.top);
                *bottom = bottom.max(placed.bottom);
                line.spans.push(placed.span);
            }
            _ => lines.push((placed.top, placed.bottom, TextLine::new(vec![placed.span]))),
        }
    }

    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut prev: Option<(f32, f32)> = None;
    for (top, bottom, line) in lines {
        let starts_block = match prev {
            None => true,
            Some((prev_top, prev_bottom)) => {
                let height = (prev_bottom - prev_top).max(1.0);
                let gap = top - prev_bottom;
                gap > height * BLOCK_LINE_MARGIN || gap < -height
            }
        };
        if starts_block {
            blocks.push(TextBlock {
                top,
                lines: Vec::new(),
            });
        }
        if let Some(block) = blocks.last_mut() {
            block.top = block.top.min(top);
            block.lines.push(line);
        }
        prev = Some((top, bottom));
    }

    blocks
}

/// Vertical extents share more than half of the shorter one.
fn overlaps(a_top: f32, a_bottom: f32, b_top: f32, b_bottom: f32) -> bool {
    let overlap = a_bottom.min(b_bottom) - a_top.max(b_top);
    let shorter = (a_bottom - a_top).min(b_bottom - b_top).max(f32::EPSILON);
    overlap > shorter * 0.5
}
