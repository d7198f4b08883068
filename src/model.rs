//! Records passed between pipeline stages.
//!
//! ```text
//! PageLayout ──extract──▶ Line ──group──▶ Paragraph ──write──▶ Docs batch
//! ```
//!
//! [`Line`] only lives between extraction and grouping; [`Paragraph`] is the
//! unit written to the remote document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural role of a line or paragraph.
///
/// The serialised names are the Docs API `namedStyleType` values, so a style
/// can be dropped into an `updateParagraphStyle` request unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParagraphStyle {
    #[serde(rename = "HEADING_1")]
    Heading1,
    #[serde(rename = "HEADING_2")]
    Heading2,
    #[default]
    #[serde(rename = "NORMAL_TEXT")]
    NormalText,
}

impl ParagraphStyle {
    /// Named style type as the Docs API spells it.
    pub fn as_named_style(&self) -> &'static str {
        match self {
            ParagraphStyle::Heading1 => "HEADING_1",
            ParagraphStyle::Heading2 => "HEADING_2",
            ParagraphStyle::NormalText => "NORMAL_TEXT",
        }
    }

    pub fn is_heading(&self) -> bool {
        !matches!(self, ParagraphStyle::NormalText)
    }
}

impl fmt::Display for ParagraphStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_named_style())
    }
}

/// One visual line of PDF text after filtering and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Span texts joined with single spaces, trimmed. Never empty.
    pub text: String,
    /// Top of the enclosing text block, in points from the top of the page.
    pub vertical_position: f32,
    pub style: ParagraphStyle,
    /// 0-based page index.
    pub page: usize,
}

impl Line {
    pub fn new(
        text: impl Into<String>,
        vertical_position: f32,
        style: ParagraphStyle,
        page: usize,
    ) -> Self {
        Self {
            text: text.into(),
            vertical_position,
            style,
            page,
        }
    }
}

/// One or more consecutive [`Line`]s merged into a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub style: ParagraphStyle,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: ParagraphStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Text as it is inserted into the document: HEADING_1 paragraphs are
    /// upper-cased, everything else is left alone.
    pub fn display_text(&self) -> String {
        match self.style {
            ParagraphStyle::Heading1 => self.text.to_uppercase(),
            _ => self.text.clone(),
        }
    }
}
