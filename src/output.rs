//! Result types returned by the conversion entry points.

use crate::model::{Paragraph, ParagraphStyle};
use serde::{Deserialize, Serialize};

pub use crate::pipeline::write::WriteReport;

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Document that was written, `None` for dry runs and empty inputs.
    pub document_id: Option<String>,
    pub paragraphs: Vec<Paragraph>,
    /// The exact text inserted (or that would be inserted).
    pub text: String,
    pub stats: ConversionStats,
    /// Present only when a batch was sent.
    pub write: Option<WriteReport>,
}

impl ConversionOutput {
    /// `true` if the remote document was updated.
    pub fn uploaded(&self) -> bool {
        self.write.is_some()
    }
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages read from the PDF.
    pub pages: usize,
    /// Lines kept after filtering.
    pub lines: usize,
    /// Lines dropped as boilerplate.
    pub filtered_lines: usize,
    pub paragraphs: usize,
    /// Paragraphs with a heading style (HEADING_1 or HEADING_2).
    pub headings: usize,
    pub extract_duration_ms: u64,
    pub upload_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl ConversionStats {
    pub(crate) fn count_paragraphs(&mut self, paragraphs: &[Paragraph]) {
        self.paragraphs = paragraphs.len();
        self.headings = paragraphs
            .iter()
            .filter(|p| p.style != ParagraphStyle::NormalText)
            .count();
    }
}
