//! Downloadable artifacts and file naming.

mod headless;

pub use headless::{CaptureError, HeadlessBrowser, BROWSER_CANDIDATES};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{MapError, Result};
use crate::render::{RenderedMap, RendererKind};

/// A file ready to be downloaded or written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Name a rendered map after its campus label
    pub fn from_rendered(label: &str, kind: RendererKind, rendered: RenderedMap) -> Self {
        let file_name = match kind {
            RendererKind::Interactive => html_file_name(label),
            RendererKind::Static => static_png_file_name(label),
        };
        Self {
            file_name,
            mime: rendered.mime(),
            bytes: rendered.into_bytes(),
        }
    }

    /// Write into `dir` (created if missing) and return the full path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| MapError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes).map_err(|source| MapError::Write {
            path: path.clone(),
            source,
        })?;

        info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Label with spaces (and path separators) replaced by underscores
pub fn file_stem(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// `<stem>.html` for the interactive map
pub fn html_file_name(label: &str) -> String {
    format!("{}.html", file_stem(label))
}

/// `<stem>_impact_map.png` for the static map
pub fn static_png_file_name(label: &str) -> String {
    format!("{}_impact_map.png", file_stem(label))
}

/// `<stem>.png` for the headless capture of the interactive map
pub fn capture_png_file_name(label: &str) -> String {
    format!("{}.png", file_stem(label))
}

/// Result of the optional PNG capture of the interactive map
#[derive(Debug, Clone, PartialEq)]
pub enum OptionalExport {
    Exported(Artifact),
    /// Capture was not possible; the message is informational only
    Skipped(String),
}

/// Try to capture the interactive map as PNG; never fails the caller
pub async fn export_optional_png(
    browser: &HeadlessBrowser,
    label: &str,
    html: &str,
) -> OptionalExport {
    match browser.capture(html).await {
        Ok(bytes) => OptionalExport::Exported(Artifact {
            file_name: capture_png_file_name(label),
            mime: "image/png",
            bytes,
        }),
        Err(e) => {
            let message = format!(
                "PNG export requires a headless Chromium-compatible browser ({})",
                e
            );
            info!("{}", message);
            OptionalExport::Skipped(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(html_file_name("Lincoln High School"), "Lincoln_High_School.html");
        assert_eq!(
            static_png_file_name("Lincoln High School"),
            "Lincoln_High_School_impact_map.png"
        );
        assert_eq!(capture_png_file_name("Lincoln High School"), "Lincoln_High_School.png");
    }

    #[test]
    fn test_file_stem_strips_separators() {
        assert_eq!(file_stem("Venice HS / Magnet"), "Venice_HS___Magnet");
        assert_eq!(file_stem(" Dorsey "), "Dorsey");
    }

    #[test]
    fn test_artifact_from_rendered() {
        let html = Artifact::from_rendered(
            "Lincoln High School",
            RendererKind::Interactive,
            RenderedMap::Html("<html></html>".into()),
        );
        assert_eq!(html.file_name, "Lincoln_High_School.html");
        assert_eq!(html.mime, "text/html");
        assert_eq!(html.bytes, b"<html></html>");

        let png = Artifact::from_rendered(
            "Lincoln High School",
            RendererKind::Static,
            RenderedMap::Png(vec![1, 2, 3]),
        );
        assert_eq!(png.file_name, "Lincoln_High_School_impact_map.png");
        assert_eq!(png.mime, "image/png");
    }

    #[test]
    fn test_write_to_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("maps");
        let artifact = Artifact {
            file_name: "X.html".into(),
            mime: "text/html",
            bytes: b"hello".to_vec(),
        };
        let path = artifact.write_to(&nested).unwrap();
        assert_eq!(path, nested.join("X.html"));
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_missing_browser_is_skipped() {
        let browser = HeadlessBrowser::new(Some("/nonexistent/chromium".into()));
        let outcome = export_optional_png(&browser, "X", "<html></html>").await;
        match outcome {
            OptionalExport::Skipped(message) => assert!(message.contains("headless")),
            other => panic!("expected Skipped, got {:?}", other),
        }
    }
}
