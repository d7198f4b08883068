//! Line extraction: page layouts → filtered, classified [`Line`]s.
//!
//! For every line of every block, in page order:
//!
//! 1. join the span texts with single spaces and trim; drop empty lines
//! 2. drop the line if it contains a boilerplate phrase (case-insensitive)
//! 3. classify it from its **first** span only, even when later spans use a
//!    different font
//! 4. record the enclosing block's top as its vertical position
//!
//! Each page's lines are then stably sorted top to bottom, because pdfium
//! does not guarantee block order matches reading order.

use crate::config::ConversionConfig;
use crate::error::Pdf2DocsError;
use crate::model::{Line, ParagraphStyle};
use crate::pipeline::layout::{PageLayout, TextLine};
use regex::Regex;
use tracing::{debug, trace};

/// Compiled classification and filtering rules.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    heading_font_size: f32,
    subheading_font_size: Option<f32>,
    ignore_phrases: Vec<String>,
    heading_keywords: Vec<String>,
    bold_font: Regex,
}

impl LineClassifier {
    pub fn from_config(config: &ConversionConfig) -> Result<Self, Pdf2DocsError> {
        let template = &config.template;
        Ok(Self {
            heading_font_size: config.heading_font_size,
            subheading_font_size: config.subheading_font_size,
            ignore_phrases: template
                .ignore_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            heading_keywords: template
                .heading_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .collect(),
            bold_font: template.bold_font_regex()?,
        })
    }

    /// `true` if `text` contains any boilerplate phrase.
    pub fn is_boilerplate(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.ignore_phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    /// Style of a line with joined text `text` and the given first-span font.
    pub fn classify(&self, text: &str, font_size: f32, font_name: &str) -> ParagraphStyle {
        let is_large = font_size > self.heading_font_size;
        let is_bold = self.bold_font.is_match(font_name);
        let lower = text.trim().to_lowercase();
        let is_keyword = self.heading_keywords.iter().any(|k| *k == lower);

        if is_large || is_bold || is_keyword {
            ParagraphStyle::Heading1
        } else if self
            .subheading_font_size
            .is_some_and(|threshold| font_size > threshold)
        {
            ParagraphStyle::Heading2
        } else {
            ParagraphStyle::NormalText
        }
    }

    fn classify_line(&self, text: &str, line: &TextLine) -> ParagraphStyle {
        match line.spans.first() {
            Some(span) => self.classify(text, span.font_size, &span.font_name),
            None => ParagraphStyle::NormalText,
        }
    }
}

/// Lines of a document plus what was thrown away on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedLines {
    pub lines: Vec<Line>,
    pub pages: usize,
    /// Lines dropped because they matched a boilerplate phrase.
    pub filtered: usize,
}

/// Turn page layouts into the ordered line sequence.
pub fn extract_lines(pages: &[PageLayout], classifier: &LineClassifier) -> ExtractedLines {
    let mut out = ExtractedLines {
        pages: pages.len(),
        ..ExtractedLines::default()
    };

    for page in pages {
        let mut page_lines = Vec::new();

        for block in &page.blocks {
            for line in &block.lines {
                let text = line.joined_text();
                if text.is_empty() {
                    continue;
                }
                if classifier.is_boilerplate(&text) {
                    trace!("Page {}: dropping boilerplate line {:?}", page.index + 1, text);
                    out.filtered += 1;
                    continue;
                }

                let style = classifier.classify_line(&text, line);
                page_lines.push(Line::new(text, block.top, style, page.index));
            }
        }

        page_lines.sort_by(|a, b| a.vertical_position.total_cmp(&b.vertical_position));
        debug!("Page {}: {} lines kept", page.index + 1, page_lines.len());
        out.lines.extend(page_lines);
    }

    out
}
