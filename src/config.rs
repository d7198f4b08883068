//! Configuration types for PDF-to-Docs conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The document-template specifics (which
//! phrases are boilerplate, which titles are section headings) live in a
//! separate [`TemplateProfile`] so the same pipeline can be pointed at a
//! different family of source documents by swapping one JSON file.

use crate::error::Pdf2DocsError;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default Docs API root.
pub const DEFAULT_API_BASE_URL: &str = "https://docs.googleapis.com/v1";

/// Default authorized-user credentials file.
pub const DEFAULT_CREDENTIALS_PATH: &str = "token.json";

/// Configuration for a PDF-to-Docs conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2docs::{ConversionConfig, DocumentTarget};
///
/// let config = ConversionConfig::builder()
///     .heading_font_size(14.0)
///     .paragraph_gap(4.0)
///     .target(DocumentTarget::Existing("1AbC".into()))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// A line whose first span is larger than this (in points) is a
    /// HEADING_1. Default: 12.
    pub heading_font_size: f32,

    /// Optional second tier: a non-HEADING_1 line whose first span is larger
    /// than this becomes HEADING_2. Default: None (two-level classification).
    pub subheading_font_size: Option<f32>,

    /// Vertical distance (points) at or beyond which two consecutive lines
    /// start separate paragraphs. Default: 5.
    ///
    /// This is an absolute distance, so it does not scale with font size.
    pub paragraph_gap: f32,

    /// Boilerplate phrases, heading keywords and the bold-font pattern.
    pub template: TemplateProfile,

    /// Where the paragraphs are written. `None` is only valid for dry runs.
    pub target: Option<DocumentTarget>,

    /// Emit paragraph/character style requests after the text insert.
    /// Default: true. When false only the plain text is inserted.
    pub apply_styles: bool,

    /// Attach the revision read before the update to the batch, so the
    /// service rejects it if someone else edited the document in between.
    /// Default: true.
    pub require_revision: bool,

    /// Authorized-user JSON file holding the Docs credentials.
    pub credentials_path: PathBuf,

    /// Docs API root, overridable for proxies and tests.
    pub api_base_url: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Explicit pdfium shared library. Falls back to `PDFIUM_LIB_PATH`, then
    /// the system loader.
    pub pdfium_library_path: Option<PathBuf>,

    /// Stage-boundary progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            heading_font_size: 12.0,
            subheading_font_size: None,
            paragraph_gap: 5.0,
            template: TemplateProfile::default(),
            target: None,
            apply_styles: true,
            require_revision: true,
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            password: None,
            pages: PageSelection::default(),
            download_timeout_secs: 120,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("heading_font_size", &self.heading_font_size)
            .field("subheading_font_size", &self.subheading_font_size)
            .field("paragraph_gap", &self.paragraph_gap)
            .field("template", &self.template)
            .field("target", &self.target)
            .field("apply_styles", &self.apply_styles)
            .field("require_revision", &self.require_revision)
            .field("credentials_path", &self.credentials_path)
            .field("api_base_url", &self.api_base_url)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn heading_font_size(mut self, points: f32) -> Self {
        self.config.heading_font_size = points;
        self
    }

    pub fn subheading_font_size(mut self, points: Option<f32>) -> Self {
        self.config.subheading_font_size = points;
        self
    }

    pub fn paragraph_gap(mut self, points: f32) -> Self {
        self.config.paragraph_gap = points;
        self
    }

    pub fn template(mut self, template: TemplateProfile) -> Self {
        self.config.template = template;
        self
    }

    pub fn target(mut self, target: DocumentTarget) -> Self {
        self.config.target = Some(target);
        self
    }

    pub fn document_id(self, id: impl Into<String>) -> Self {
        self.target(DocumentTarget::Existing(id.into()))
    }

    pub fn apply_styles(mut self, v: bool) -> Self {
        self.config.apply_styles = v;
        self
    }

    pub fn require_revision(mut self, v: bool) -> Self {
        self.config.require_revision = v;
        self
    }

    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.credentials_path = path.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2DocsError> {
        let c = &self.config;
        if !(c.heading_font_size.is_finite() && c.heading_font_size > 0.0) {
            return Err(Pdf2DocsError::InvalidConfig(format!(
                "heading font size must be a positive number, got {}",
                c.heading_font_size
            )));
        }
        if let Some(sub) = c.subheading_font_size {
            if !(sub.is_finite() && sub > 0.0) {
                return Err(Pdf2DocsError::InvalidConfig(format!(
                    "subheading font size must be a positive number, got {sub}"
                )));
            }
            if sub >= c.heading_font_size {
                return Err(Pdf2DocsError::InvalidConfig(format!(
                    "subheading font size ({sub}) must be below the heading font size ({})",
                    c.heading_font_size
                )));
            }
        }
        if !(c.paragraph_gap.is_finite() && c.paragraph_gap > 0.0) {
            return Err(Pdf2DocsError::InvalidConfig(format!(
                "paragraph gap must be a positive number, got {}",
                c.paragraph_gap
            )));
        }
        c.template.bold_font_regex()?;
        if let Some(DocumentTarget::Existing(id)) = &c.target {
            if id.trim().is_empty() {
                return Err(Pdf2DocsError::InvalidConfig(
                    "document id must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Template profile ─────────────────────────────────────────────────────

/// Document-template knowledge: what to throw away and what is a heading.
///
/// Loadable from JSON; every field is optional in the file:
///
/// ```json
/// {
///   "ignore_phrases": ["ACME Corp.", "Tel.:"],
///   "heading_keywords": ["Description", "Physical Data"],
///   "bold_font_pattern": "(?i)bold|black"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateProfile {
    /// A line containing any of these (case-insensitive) is dropped.
    pub ignore_phrases: Vec<String>,
    /// A line whose trimmed text equals one of these (case-insensitive) is a
    /// HEADING_1 regardless of its font.
    pub heading_keywords: Vec<String>,
    /// Regex matched against the first span's font name; a match marks the
    /// line as HEADING_1.
    pub bold_font_pattern: String,
}

static DEFAULT_HEADING_KEYWORDS: &[&str] = &[
    "Description",
    "Recommended Use",
    "Physical Data",
    "Application Data",
    "Notes",
    "Health & Safety",
    "Limitation of Liability",
    "Application Method",
    "Additional Information",
];

impl Default for TemplateProfile {
    fn default() -> Self {
        Self {
            ignore_phrases: Vec::new(),
            heading_keywords: DEFAULT_HEADING_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bold_font_pattern: "(?i)bold".to_string(),
        }
    }
}

impl TemplateProfile {
    /// Read a profile from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Pdf2DocsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Pdf2DocsError::TemplateLoadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let profile: TemplateProfile =
            serde_json::from_str(&raw).map_err(|e| Pdf2DocsError::TemplateLoadFailed {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        profile.bold_font_regex()?;
        Ok(profile)
    }

    /// Compile [`Self::bold_font_pattern`].
    pub fn bold_font_regex(&self) -> Result<Regex, Pdf2DocsError> {
        Regex::new(&self.bold_font_pattern).map_err(|e| {
            Pdf2DocsError::InvalidConfig(format!(
                "invalid bold font pattern '{}': {e}",
                self.bold_font_pattern
            ))
        })
    }
}

// ── Target document ──────────────────────────────────────────────────────

/// The document the paragraphs are written into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentTarget {
    /// Replace the content of an existing document.
    Existing(String),
    /// Create a fresh document with this title, then fill it.
    New { title: String },
}

static RE_DOCUMENT_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://docs\.google\.com/document/(?:u/\d+/)?d/([A-Za-z0-9_-]+)")
        .expect("document URL pattern is valid")
});

impl DocumentTarget {
    /// Accept either a bare document id or a `docs.google.com` document URL.
    pub fn parse_existing(input: &str) -> Result<Self, Pdf2DocsError> {
        let input = input.trim();
        if let Some(caps) = RE_DOCUMENT_URL.captures(input) {
            return Ok(DocumentTarget::Existing(caps[1].to_string()));
        }
        if input.is_empty()
            || !input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Pdf2DocsError::InvalidConfig(format!(
                "'{input}' is neither a document id nor a Google Docs URL"
            )));
        }
        Ok(DocumentTarget::Existing(input.to_string()))
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// Specifies which pages of the PDF to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Extract all pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
