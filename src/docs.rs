//! Google Docs API: wire types and the [`DocumentService`] seam.
//!
//! Only the slice of the API the writer needs is modelled: reading a
//! document's body, `documents.batchUpdate` with four request kinds, and
//! `documents.create`. Every index is a UTF-16 code unit offset into the
//! document body, as the API defines it.
//!
//! [`GoogleDocsClient`] is the `reqwest` implementation. The writer is
//! generic over [`DocumentService`] so tests can run it against an in-memory
//! document.

use crate::error::Pdf2DocsError;
use crate::model::ParagraphStyle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Requests ─────────────────────────────────────────────────────────────

/// A half-open `[start_index, end_index)` range of the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: u32,
    pub end_index: u32,
}

impl Range {
    pub fn new(start_index: u32, end_index: u32) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> u32 {
        self.end_index.saturating_sub(self.start_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertText {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteContentRange {
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedParagraphStyle {
    pub named_style_type: ParagraphStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyle {
    pub range: Range,
    pub paragraph_style: NamedParagraphStyle,
    /// Field mask; only the listed fields are changed.
    pub fields: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    pub range: Range,
    pub text_style: TextStyle,
    pub fields: String,
}

/// One edit operation inside a batch.
///
/// Serialises to the API's one-key-object form, e.g.
/// `{"insertText": {"location": {"index": 1}, "text": "…"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText(InsertText),
    DeleteContentRange(DeleteContentRange),
    UpdateParagraphStyle(UpdateParagraphStyle),
    UpdateTextStyle(UpdateTextStyle),
}

impl Request {
    pub fn insert_text(index: u32, text: impl Into<String>) -> Self {
        Request::InsertText(InsertText {
            location: Location { index },
            text: text.into(),
        })
    }

    pub fn delete_range(range: Range) -> Self {
        Request::DeleteContentRange(DeleteContentRange { range })
    }

    pub fn paragraph_style(range: Range, style: ParagraphStyle) -> Self {
        Request::UpdateParagraphStyle(UpdateParagraphStyle {
            range,
            paragraph_style: NamedParagraphStyle {
                named_style_type: style,
            },
            fields: "namedStyleType".to_string(),
        })
    }

    pub fn bold(range: Range) -> Self {
        Request::UpdateTextStyle(UpdateTextStyle {
            range,
            text_style: TextStyle { bold: true },
            fields: "bold".to_string(),
        })
    }

    /// Lowest body index this request touches.
    pub fn start_index(&self) -> u32 {
        match self {
            Request::InsertText(r) => r.location.index,
            Request::DeleteContentRange(r) => r.range.start_index,
            Request::UpdateParagraphStyle(r) => r.range.start_index,
            Request::UpdateTextStyle(r) => r.range.start_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteControl {
    pub required_revision_id: String,
}

/// Body of `documents.batchUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdate {
    pub requests: Vec<Request>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_control: Option<WriteControl>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}

// ── Documents ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    #[serde(default)]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BodyParagraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

/// Top-level element of the body (paragraph, section break, table, …).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    #[serde(default)]
    pub start_index: Option<u32>,
    #[serde(default)]
    pub end_index: u32,
    #[serde(default)]
    pub paragraph: Option<BodyParagraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

/// The parts of `documents.get` the writer reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub revision_id: Option<String>,
    #[serde(default)]
    pub body: Body,
}

impl Document {
    /// Concatenated text of every paragraph text run in the body.
    pub fn body_text(&self) -> String {
        self.body
            .content
            .iter()
            .filter_map(|el| el.paragraph.as_ref())
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| e.text_run.as_ref())
            .map(|r| r.content.as_str())
            .collect()
    }

    /// `endIndex` of the last structural element.
    pub fn end_index(&self) -> Option<u32> {
        self.body.content.last().map(|el| el.end_index)
    }
}

// ── Service seam ─────────────────────────────────────────────────────────

/// The remote document operations the writer depends on.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn get_document(&self, document_id: &str) -> Result<Document, Pdf2DocsError>;

    /// Apply `batch` atomically: the service applies every request or none.
    async fn batch_update(
        &self,
        document_id: &str,
        batch: &BatchUpdate,
    ) -> Result<BatchUpdateResponse, Pdf2DocsError>;

    async fn create_document(&self, title: &str) -> Result<Document, Pdf2DocsError>;
}

/// [`DocumentService`] over the Google Docs REST API.
#[derive(Debug, Clone)]
pub struct GoogleDocsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GoogleDocsClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    fn document_url(&self, document_id: &str) -> String {
        format!("{}/documents/{}", self.base_url, document_id)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        document_id: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Pdf2DocsError> {
        let network_err = |e: reqwest::Error| Pdf2DocsError::RemoteUpdateFailed {
            document_id: document_id.to_string(),
            status: None,
            detail: e.to_string(),
        };

        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(network_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(document_id, status.as_u16(), &body));
        }

        response.json::<T>().await.map_err(network_err)
    }
}

/// Turn a non-2xx answer into an error, preferring the API's own message.
fn map_api_error(document_id: &str, status: u16, body: &str) -> Pdf2DocsError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| {
            if b.error.status.is_empty() {
                b.error.message
            } else {
                format!("{}: {}", b.error.status, b.error.message)
            }
        })
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        401 | 403 => Pdf2DocsError::Unauthorized {
            document_id: document_id.to_string(),
            detail,
        },
        _ => Pdf2DocsError::RemoteUpdateFailed {
            document_id: document_id.to_string(),
            status: Some(status),
            detail,
        },
    }
}

#[async_trait]
impl DocumentService for GoogleDocsClient {
    async fn get_document(&self, document_id: &str) -> Result<Document, Pdf2DocsError> {
        debug!("GET document {}", document_id);
        let request = self.http.get(self.document_url(document_id));
        self.send(document_id, request).await
    }

    async fn batch_update(
        &self,
        document_id: &str,
        batch: &BatchUpdate,
    ) -> Result<BatchUpdateResponse, Pdf2DocsError> {
        debug!(
            "batchUpdate document {} with {} requests",
            document_id,
            batch.requests.len()
        );
        let url = format!("{}:batchUpdate", self.document_url(document_id));
        let request = self.http.post(url).json(batch);
        self.send(document_id, request).await
    }

    async fn create_document(&self, title: &str) -> Result<Document, Pdf2DocsError> {
        debug!("Creating document {:?}", title);
        let url = format!("{}/documents", self.base_url);
        let request = self
            .http
            .post(url)
            .json(&serde_json::json!({ "title": title }));
        self.send("<new>", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_serialise_to_api_shape() {
        let batch = BatchUpdate {
            requests: vec![
                Request::delete_range(Range::new(1, 119)),
                Request::insert_text(1, "DESCRIPTION\n"),
                Request::paragraph_style(Range::new(1, 13), ParagraphStyle::Heading1),
                Request::bold(Range::new(1, 12)),
            ],
            write_control: Some(WriteControl {
                required_revision_id: "rev-7".into(),
            }),
        };

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            value,
            json!({
                "requests": [
                    {"deleteContentRange": {"range": {"startIndex": 1, "endIndex": 119}}},
                    {"insertText": {"location": {"index": 1}, "text": "DESCRIPTION\n"}},
                    {"updateParagraphStyle": {
                        "range": {"startIndex": 1, "endIndex": 13},
                        "paragraphStyle": {"namedStyleType": "HEADING_1"},
                        "fields": "namedStyleType"
                    }},
                    {"updateTextStyle": {
                        "range": {"startIndex": 1, "endIndex": 12},
                        "textStyle": {"bold": true},
                        "fields": "bold"
                    }}
                ],
                "writeControl": {"requiredRevisionId": "rev-7"}
            })
        );
    }

    #[test]
    fn write_control_is_omitted_when_absent() {
        let batch = BatchUpdate {
            requests: vec![],
            write_control: None,
        };
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value, json!({"requests": []}));
    }

    #[test]
    fn document_parses_and_exposes_text() {
        let doc: Document = serde_json::from_value(json!({
            "documentId": "doc-1",
            "title": "Data sheet",
            "revisionId": "abc",
            "body": {"content": [
                {"endIndex": 1, "sectionBreak": {}},
                {"startIndex": 1, "endIndex": 7, "paragraph": {"elements": [
                    {"startIndex": 1, "endIndex": 7, "textRun": {"content": "Hello\n"}}
                ]}},
                {"startIndex": 7, "endIndex": 13, "paragraph": {"elements": [
                    {"startIndex": 7, "endIndex": 13, "textRun": {"content": "World\n"}}
                ]}}
            ]}
        }))
        .unwrap();

        assert_eq!(doc.document_id, "doc-1");
        assert_eq!(doc.revision_id.as_deref(), Some("abc"));
        assert_eq!(doc.body_text(), "Hello\nWorld\n");
        assert_eq!(doc.end_index(), Some(13));
    }

    #[test]
    fn document_without_body_is_empty() {
        let doc: Document = serde_json::from_value(json!({"documentId": "x"})).unwrap();
        assert_eq!(doc.end_index(), None);
        assert_eq!(doc.body_text(), "");
    }

    #[test]
    fn api_errors_map_to_typed_errors() {
        let body = r#"{"error": {"code": 400, "message": "Invalid requests[0].deleteContentRange: The range should not be empty.", "status": "INVALID_ARGUMENT"}}"#;
        match map_api_error("doc", 400, body) {
            Pdf2DocsError::RemoteUpdateFailed { status, detail, .. } => {
                assert_eq!(status, Some(400));
                assert!(detail.starts_with("INVALID_ARGUMENT: Invalid requests[0]"));
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            map_api_error("doc", 403, "{}"),
            Pdf2DocsError::Unauthorized { .. }
        ));
        match map_api_error("doc", 502, "<html>Bad Gateway</html>") {
            Pdf2DocsError::RemoteUpdateFailed { detail, .. } => {
                assert_eq!(detail, "<html>Bad Gateway</html>")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn range_helpers() {
        assert!(Range::new(1, 1).is_empty());
        assert!(Range::new(5, 2).is_empty());
        assert_eq!(Range::new(1, 119).len(), 118);
        assert_eq!(Range::new(5, 2).len(), 0);
    }

    #[tokio::test]
    async fn batch_update_posts_to_document_endpoint_with_bearer() {
        let (base, server) =
            crate::test_http::serve_once(200, r#"{"documentId": "doc-1", "replies": [{}, {}]}"#)
                .await;
        let client = GoogleDocsClient::new(reqwest::Client::new(), format!("{base}/v1/"), "ya29.tok");
        let batch = BatchUpdate {
            requests: vec![
                Request::delete_range(Range::new(1, 40)),
                Request::insert_text(1, "DESCRIPTION\n"),
            ],
            write_control: Some(WriteControl {
                required_revision_id: "rev-3".into(),
            }),
        };

        let response = client.batch_update("doc-1", &batch).await.unwrap();
        assert_eq!(response.document_id.as_deref(), Some("doc-1"));
        assert_eq!(response.replies.len(), 2);

        let seen = server.await.unwrap();
        assert_eq!(seen.request_line, "POST /v1/documents/doc-1:batchUpdate HTTP/1.1");
        assert_eq!(seen.header("authorization"), Some("Bearer ya29.tok"));
        let sent: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
        assert_eq!(sent, serde_json::to_value(&batch).unwrap());
        assert_eq!(sent["writeControl"]["requiredRevisionId"], "rev-3");
    }

    #[tokio::test]
    async fn get_document_decodes_body() {
        let (base, server) = crate::test_http::serve_once(
            200,
            r#"{"documentId": "doc-1", "title": "TDS", "revisionId": "rev-9",
                "body": {"content": [{"endIndex": 1},
                  {"startIndex": 1, "endIndex": 6,
                   "paragraph": {"elements": [{"textRun": {"content": "Text\n"}}]}}]}}"#,
        )
        .await;
        let client = GoogleDocsClient::new(reqwest::Client::new(), base, "ya29.tok");

        let document = client.get_document("doc-1").await.unwrap();
        assert_eq!(document.revision_id.as_deref(), Some("rev-9"));
        assert_eq!(document.body_text(), "Text\n");

        let seen = server.await.unwrap();
        assert_eq!(seen.request_line, "GET /documents/doc-1 HTTP/1.1");
    }

    #[tokio::test]
    async fn create_document_sends_title() {
        let (base, server) =
            crate::test_http::serve_once(200, r#"{"documentId": "new-1", "title": "TDS"}"#).await;
        let client = GoogleDocsClient::new(reqwest::Client::new(), base, "ya29.tok");

        let created = client.create_document("TDS").await.unwrap();
        assert_eq!(created.document_id, "new-1");

        let seen = server.await.unwrap();
        assert_eq!(seen.request_line, "POST /documents HTTP/1.1");
        assert_eq!(seen.body, r#"{"title":"TDS"}"#);
    }

    #[tokio::test]
    async fn rejected_batch_surfaces_api_status() {
        let (base, _server) = crate::test_http::serve_once(
            400,
            r#"{"error": {"code": 400, "message": "Invalid requests[1]", "status": "INVALID_ARGUMENT"}}"#,
        )
        .await;
        let client = GoogleDocsClient::new(reqwest::Client::new(), base, "ya29.tok");
        let batch = BatchUpdate {
            requests: vec![Request::insert_text(1, "x\n")],
            write_control: None,
        };

        match client.batch_update("doc-1", &batch).await.unwrap_err() {
            Pdf2DocsError::RemoteUpdateFailed { status, detail, .. } => {
                assert_eq!(status, Some(400));
                assert_eq!(detail, "INVALID_ARGUMENT: Invalid requests[1]");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
