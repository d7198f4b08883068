//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! pdfium opens documents by path, so a URL is downloaded into a `TempDir`
//! that lives as long as the returned [`ResolvedInput`]. Both branches check
//! the `%PDF` magic bytes before handing the path on.

use crate::error::Pdf2DocsError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A local path to the PDF, owning its temp directory if it was downloaded.
#[derive(Debug)]
pub enum ResolvedInput {
    Local(PathBuf),
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve `input` to a readable local PDF.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, Pdf2DocsError> {
    let input = input.trim();
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn check_magic(path: PathBuf, head: &[u8]) -> Result<PathBuf, Pdf2DocsError> {
    if head.len() >= 4 && &head[..4] != PDF_MAGIC {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&head[..4]);
        return Err(Pdf2DocsError::NotAPdf { path, magic });
    }
    Ok(path)
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, Pdf2DocsError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(Pdf2DocsError::FileNotFound { path });
    }

    let mut head = Vec::with_capacity(4);
    match std::fs::File::open(&path) {
        Ok(f) => {
            f.take(4)
                .read_to_end(&mut head)
                .map_err(|e| Pdf2DocsError::Internal(format!("Failed to read {}: {e}", path.display())))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2DocsError::PermissionDenied { path });
        }
        Err(_) => return Err(Pdf2DocsError::FileNotFound { path }),
    }

    let path = check_magic(path, &head)?;
    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Pdf2DocsError> {
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| Pdf2DocsError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Pdf2DocsError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let filename = filename_from_url(url);
    let temp_dir = TempDir::new().map_err(|e| Pdf2DocsError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(filename);

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Pdf2DocsError::Internal(format!("Failed to write temp file: {}", e)))?;

    let path = check_magic(file_path, &bytes)?;
    info!("Downloaded {} bytes to: {}", bytes.len(), path.display());

    Ok(ResolvedInput::Downloaded {
        path,
        _temp_dir: temp_dir,
    })
}

/// Last path segment of `url` if it looks like a file name.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty() && last.contains('.'))
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_comes_from_last_segment() {
        assert_eq!(
            filename_from_url("https://example.com/sheets/tds-42.pdf?dl=1"),
            "tds-42.pdf"
        );
        assert_eq!(filename_from_url("https://example.com/download"), "downloaded.pdf");
        assert_eq!(filename_from_url("https://example.com/"), "downloaded.pdf");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_local("/no/such/dir/sheet.pdf").unwrap_err();
        assert!(matches!(err, Pdf2DocsError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_local(dir.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Pdf2DocsError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"PK\x03\x04 not a pdf").unwrap();
        match resolve_local(file.path().to_str().unwrap()).unwrap_err() {
            Pdf2DocsError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pdf_header_is_accepted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n").unwrap();
        let resolved = resolve_local(file.path().to_str().unwrap()).unwrap();
        assert_eq!(resolved.path(), file.path());
    }
}
