//! PNG capture of HTML maps through a headless Chromium-compatible browser.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;
use url::Url;

/// Executable names searched on PATH when no browser is configured
pub const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
    "microsoft-edge",
];

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no headless browser found (tried {0})")]
    BrowserUnavailable(String),

    #[error("browser I/O failed")]
    Io(#[from] std::io::Error),

    #[error("browser exited with {status}: {stderr}")]
    BrowserFailed { status: String, stderr: String },

    #[error("browser produced no screenshot")]
    EmptyScreenshot,

    #[error("cannot express {0:?} as a file URL")]
    PageUrl(PathBuf),
}

/// Headless screenshot settings
#[derive(Debug, Clone)]
pub struct HeadlessBrowser {
    binary: Option<PathBuf>,
    window: (u32, u32),
    /// Time given to tiles and scripts before the screenshot
    delay: Duration,
}

impl Default for HeadlessBrowser {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HeadlessBrowser {
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self {
            binary,
            window: (700, 500),
            delay: Duration::from_secs(5),
        }
    }

    pub fn with_window(mut self, width: u32, height: u32) -> Self {
        self.window = (width.max(1), height.max(1));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Configured binary, or the first candidate found on PATH.
    ///
    /// A configured bare name such as `chromium` is looked up on PATH too.
    pub fn locate(&self) -> Result<PathBuf, CaptureError> {
        match &self.binary {
            Some(binary) if binary.is_file() => Ok(binary.clone()),
            Some(binary) if binary.components().count() == 1 => {
                search_path(&[binary.as_os_str()]).ok_or_else(|| {
                    CaptureError::BrowserUnavailable(binary.display().to_string())
                })
            }
            Some(binary) => Err(CaptureError::BrowserUnavailable(
                binary.display().to_string(),
            )),
            None => {
                let names: Vec<&OsStr> = BROWSER_CANDIDATES.iter().map(OsStr::new).collect();
                search_path(&names).ok_or_else(|| {
                    CaptureError::BrowserUnavailable(BROWSER_CANDIDATES.join(", "))
                })
            }
        }
    }

    /// Render `html` and return the screenshot as PNG bytes
    pub async fn capture(&self, html: &str) -> Result<Vec<u8>, CaptureError> {
        let binary = self.locate()?;

        let workdir = tempfile::Builder::new()
            .prefix("impact-zone-capture-")
            .tempdir()?;
        let page = workdir.path().join("map.html");
        let shot = workdir.path().join("map.png");
        let page_url =
            Url::from_file_path(&page).map_err(|_| CaptureError::PageUrl(page.clone()))?;
        tokio::fs::write(&page, html).await?;

        debug!("Capturing {} with {}", page.display(), binary.display());

        let output = Command::new(&binary)
            .args(self.args(&page_url, &shot))
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(CaptureError::BrowserFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        match tokio::fs::read(&shot).await {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            Ok(_) => Err(CaptureError::EmptyScreenshot),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CaptureError::EmptyScreenshot)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn args(&self, page: &Url, shot: &Path) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            "--no-first-run".to_string(),
            format!("--window-size={},{}", self.window.0, self.window.1),
            format!("--virtual-time-budget={}", self.delay.as_millis()),
            format!("--screenshot={}", shot.display()),
            page.to_string(),
        ]
    }
}

/// First `names` entry found as a file in a PATH directory
fn search_path(names: &[&OsStr]) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var).find_map(|dir| {
        names
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}
