//! Document writer: paragraphs → one Docs `batchUpdate`.
//!
//! ## Offsets
//!
//! Requests inside a batch are applied in order, each against the document
//! as the previous ones left it. The batch is therefore laid out as
//!
//! ```text
//! deleteContentRange [1, end)          (document is now just "\n")
//! insertText @1  "P1\nP2\n…Pn\n"
//! updateParagraphStyle [o1, o1+len1)   o1 = 1
//! updateTextStyle      [o1, o1+len1-1) headings only, newline excluded
//! updateParagraphStyle [o2, o2+len2)   o2 = o1 + len1
//! …
//! ```
//!
//! where `len` is the UTF-16 length of a paragraph's inserted text including
//! its newline. Style offsets never decrease, and all of them are computed
//! against the post-insert state.
//!
//! ## Clearing
//!
//! Index 0 is not addressable and the body's final newline may not be
//! deleted, so the clearable range is `[1, last endIndex)` minus one more if
//! the body text ends with a newline.

use crate::docs::{BatchUpdate, Document, DocumentService, Range, Request, WriteControl};
use crate::error::Pdf2DocsError;
use crate::model::Paragraph;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// First insertable index of a document body.
pub const INSERTION_ORIGIN: u32 = 1;

/// Length of `text` in the API's unit.
pub fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Range holding everything that may be deleted, or `None` when there is
/// nothing to clear.
pub fn deletable_range(document: &Document) -> Option<Range> {
    if document.body.content.len() < 2 {
        info!("Document is empty or has no content to delete");
        return None;
    }

    let end = document.end_index()?;
    let end = if document.body_text().ends_with('\n') {
        end.saturating_sub(1)
    } else {
        end
    };

    let range = Range::new(INSERTION_ORIGIN, end);
    if range.is_empty() {
        debug!("Nothing to delete (range {:?})", range);
        return None;
    }
    Some(range)
}

/// Text inserted for `paragraphs`: each paragraph's display text followed
/// by a newline.
pub fn render_text(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|p| {
            let mut text = p.display_text();
            text.push('\n');
            text
        })
        .collect()
}

/// The ordered request list for one update, and the text it inserts.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPlan {
    pub requests: Vec<Request>,
    pub inserted_text: String,
}

/// Lay out the batch for clearing `delete` and writing `paragraphs`.
pub fn plan_edits(delete: Option<Range>, paragraphs: &[Paragraph], apply_styles: bool) -> EditPlan {
    let mut requests = Vec::new();
    if let Some(range) = delete.filter(|r| !r.is_empty()) {
        requests.push(Request::delete_range(range));
    }

    let inserted_text = render_text(paragraphs);
    if inserted_text.is_empty() {
        return EditPlan {
            requests,
            inserted_text,
        };
    }
    requests.push(Request::insert_text(INSERTION_ORIGIN, inserted_text.clone()));

    if apply_styles {
        let mut offset = INSERTION_ORIGIN;
        for paragraph in paragraphs {
            let len = utf16_len(&paragraph.display_text()) + 1;
            requests.push(Request::paragraph_style(
                Range::new(offset, offset + len),
                paragraph.style,
            ));
            if paragraph.style.is_heading() && len > 1 {
                requests.push(Request::bold(Range::new(offset, offset + len - 1)));
            }
            offset += len;
        }
    }

    EditPlan {
        requests,
        inserted_text,
    }
}

/// What one update did to the remote document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReport {
    pub document_id: String,
    /// Range cleared before inserting, if anything was cleared.
    pub cleared: Option<(u32, u32)>,
    pub requests: usize,
    /// UTF-16 code units inserted.
    pub inserted_units: usize,
    /// Revision the batch was pinned to.
    pub base_revision: Option<String>,
}

/// Writes paragraphs into a document through a [`DocumentService`].
pub struct DocumentWriter<'a, S: DocumentService> {
    service: &'a S,
    apply_styles: bool,
    require_revision: bool,
    progress: Option<ProgressCallback>,
}

impl<'a, S: DocumentService> DocumentWriter<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            apply_styles: true,
            require_revision: true,
            progress: None,
        }
    }

    pub fn apply_styles(mut self, v: bool) -> Self {
        self.apply_styles = v;
        self
    }

    pub fn require_revision(mut self, v: bool) -> Self {
        self.require_revision = v;
        self
    }

    pub fn progress(mut self, cb: Option<ProgressCallback>) -> Self {
        self.progress = cb;
        self
    }

    /// Read the document, then replace its content with `paragraphs` in a
    /// single batch.
    pub async fn replace_content(
        &self,
        document_id: &str,
        paragraphs: &[Paragraph],
    ) -> Result<(WriteReport, EditPlan), Pdf2DocsError> {
        let document = self.service.get_document(document_id).await?;
        let delete = deletable_range(&document);
        if let Some(range) = delete {
            debug!(
                "Clearing {} units [{}, {}) of {}",
                range.len(),
                range.start_index,
                range.end_index,
                document_id
            );
        }
        let plan = plan_edits(delete, paragraphs, self.apply_styles);

        let base_revision = if self.require_revision {
            document.revision_id.clone()
        } else {
            None
        };

        let report = WriteReport {
            document_id: document_id.to_string(),
            cleared: delete.map(|r| (r.start_index, r.end_index)),
            requests: plan.requests.len(),
            inserted_units: utf16_len(&plan.inserted_text) as usize,
            base_revision: base_revision.clone(),
        };

        if plan.requests.is_empty() {
            info!("Document {} already empty and nothing to insert", document_id);
            return Ok((report, plan));
        }

        let batch = BatchUpdate {
            requests: plan.requests.clone(),
            write_control: base_revision.map(|required_revision_id| WriteControl {
                required_revision_id,
            }),
        };

        info!(
            "Updating document {}: {} requests, {} units inserted",
            document_id, report.requests, report.inserted_units
        );
        if let Some(ref cb) = self.progress {
            cb.on_upload_start(document_id, report.requests);
        }
        self.service.batch_update(document_id, &batch).await?;
        if let Some(ref cb) = self.progress {
            cb.on_upload_complete(document_id, report.inserted_units);
        }
        Ok((report, plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{Body, BodyParagraph, ParagraphElement, StructuralElement, TextRun};
    use crate::model::ParagraphStyle;

    fn doc_with(elements: Vec<(Option<u32>, u32, &str)>) -> Document {
        Document {
            document_id: "doc".into(),
            body: Body {
                content: elements
                    .into_iter()
                    .map(|(start, end, text)| StructuralElement {
                        start_index: start,
                        end_index: end,
                        paragraph: start.map(|_| BodyParagraph {
                            elements: vec![ParagraphElement {
                                text_run: Some(TextRun {
                                    content: text.to_string(),
                                }),
                            }],
                        }),
                    })
                    .collect(),
            },
            ..Document::default()
        }
    }

    #[test]
    fn delete_range_drops_trailing_newline() {
        let body = format!("{}\n", "x".repeat(118));
        let doc = doc_with(vec![(None, 1, ""), (Some(1), 120, &body)]);
        assert_eq!(deletable_range(&doc), Some(Range::new(1, 119)));
    }

    #[test]
    fn delete_range_keeps_end_without_trailing_newline() {
        let doc = doc_with(vec![(None, 1, ""), (Some(1), 6, "hello")]);
        assert_eq!(deletable_range(&doc), Some(Range::new(1, 6)));
    }

    #[test]
    fn blank_document_has_nothing_to_delete() {
        // A new document: section break plus a lone newline paragraph.
        let doc = doc_with(vec![(None, 1, ""), (Some(1), 2, "\n")]);
        assert_eq!(deletable_range(&doc), None);

        let bare = doc_with(vec![(None, 1, "")]);
        assert_eq!(deletable_range(&bare), None);
    }

    #[test]
    fn rendered_text_upper_cases_heading_1_only() {
        let paragraphs = vec![
            Paragraph::new("Description", ParagraphStyle::Heading1),
            Paragraph::new("Our product is durable.", ParagraphStyle::NormalText),
            Paragraph::new("Physical Data", ParagraphStyle::Heading1),
        ];
        assert_eq!(
            render_text(&paragraphs),
            "DESCRIPTION\nOur product is durable.\nPHYSICAL DATA\n"
        );
    }

    #[test]
    fn plan_offsets_run_over_inserted_lengths() {
        let paragraphs = vec![
            Paragraph::new("Notes", ParagraphStyle::Heading1),
            Paragraph::new("Stir well.", ParagraphStyle::NormalText),
        ];
        let plan = plan_edits(Some(Range::new(1, 40)), &paragraphs, true);
        assert_eq!(
            plan.requests,
            vec![
                Request::delete_range(Range::new(1, 40)),
                Request::insert_text(1, "NOTES\nStir well.\n"),
                Request::paragraph_style(Range::new(1, 7), ParagraphStyle::Heading1),
                Request::bold(Range::new(1, 6)),
                Request::paragraph_style(Range::new(7, 18), ParagraphStyle::NormalText),
            ]
        );
    }

    #[test]
    fn plan_style_offsets_never_decrease() {
        let paragraphs: Vec<_> = (0..20)
            .map(|i| {
                let style = if i % 3 == 0 {
                    ParagraphStyle::Heading1
                } else {
                    ParagraphStyle::NormalText
                };
                Paragraph::new(format!("paragraph number {i}"), style)
            })
            .collect();
        let plan = plan_edits(None, &paragraphs, true);
        let starts: Vec<u32> = plan.requests.iter().skip(1).map(Request::start_index).collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]), "{starts:?}");

        // Last paragraph style ends exactly at the end of the inserted text.
        match plan.requests.last() {
            Some(Request::UpdateParagraphStyle(r)) => {
                assert_eq!(r.range.end_index, INSERTION_ORIGIN + utf16_len(&plan.inserted_text))
            }
            other => panic!("unexpected last request {other:?}"),
        }
    }

    #[test]
    fn offsets_count_utf16_units() {
        let paragraphs = vec![
            Paragraph::new("Grip 😀", ParagraphStyle::NormalText),
            Paragraph::new("next", ParagraphStyle::NormalText),
        ];
        let plan = plan_edits(None, &paragraphs, true);
        // "Grip 😀\n" is 8 UTF-16 units (the emoji is a surrogate pair).
        assert_eq!(
            plan.requests[1],
            Request::paragraph_style(Range::new(1, 9), ParagraphStyle::NormalText)
        );
        assert_eq!(
            plan.requests[2],
            Request::paragraph_style(Range::new(9, 14), ParagraphStyle::NormalText)
        );
    }

    #[test]
    fn plain_mode_inserts_text_only() {
        let paragraphs = vec![Paragraph::new("Notes", ParagraphStyle::Heading1)];
        let plan = plan_edits(None, &paragraphs, false);
        assert_eq!(plan.requests, vec![Request::insert_text(1, "NOTES\n")]);
    }

    #[test]
    fn empty_paragraphs_only_clear() {
        let plan = plan_edits(Some(Range::new(1, 10)), &[], true);
        assert_eq!(plan.requests, vec![Request::delete_range(Range::new(1, 10))]);
        assert!(plan.inserted_text.is_empty());

        let nothing = plan_edits(None, &[], true);
        assert!(nothing.requests.is_empty());
    }
}
