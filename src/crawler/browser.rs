//! Headless browser rendering
//!
//! Pages that need JavaScript are rendered by a headless Chromium driven with
//! `chromiumoxide`. The browser is launched on the first rendered fetch and
//! shared by every later one.

use crate::{FetchError, TrawlError};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Environment variable naming an explicit browser executable
pub const BROWSER_ENV: &str = "CHROME_EXECUTABLE";

/// Environment variable overriding the managed browser cache directory
pub const CACHE_DIR_ENV: &str = "TRAWL_CACHE_DIR";

/// File in the cache directory recording the managed browser executable
const INSTALLED_MARKER: &str = "executable-path";

const INSTALL_HINT: &str = "run `trawl install` or set CHROME_EXECUTABLE";

/// Well-known browser install locations, checked in order
#[cfg(target_os = "macos")]
const KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/homebrew/bin/chromium",
];

#[cfg(target_os = "windows")]
const KNOWN_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const KNOWN_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/usr/local/bin/chromium",
    "/opt/google/chrome/chrome",
];

/// Renders pages through a lazily launched headless browser
pub struct BrowserRenderer {
    browser: OnceCell<Browser>,
    executable: Option<PathBuf>,
    user_agent: String,
    timeout: Duration,
}

impl BrowserRenderer {
    /// Creates a renderer; no browser process is started yet
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self {
            browser: OnceCell::new(),
            executable: None,
            user_agent: user_agent.to_string(),
            timeout,
        }
    }

    /// Uses `executable` instead of searching for an installed browser
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    /// Navigates to `url` and returns the serialized DOM after load
    ///
    /// The browser is never downloaded here: when none is installed the fetch
    /// fails and the user is pointed at `trawl install`. The tab opened for
    /// `url` is closed on every exit path, including the timeout and the
    /// caller dropping this future.
    pub async fn render(&self, url: &str) -> Result<String, FetchError> {
        let browser = self
            .browser
            .get_or_try_init(|| launch(self.executable.clone(), &self.user_agent, self.timeout))
            .await
            .map_err(|message| FetchError::Browser {
                url: url.to_string(),
                message,
            })?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_error(url, e))?;
        let guard = OpenPage(Some(page.clone()));

        let rendered = tokio::time::timeout(self.timeout, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            page.content().await
        })
        .await;

        guard.close(url).await;

        match rendered {
            Ok(content) => content.map_err(|e| browser_error(url, e)),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }),
        }
    }
}

/// A browser tab that is closed when dropped
///
/// Dropping a `Page` leaves its target open, so an unclosed tab is closed from
/// a spawned task instead.
struct OpenPage(Option<Page>);

impl OpenPage {
    async fn close(mut self, url: &str) {
        if let Some(page) = self.0.take() {
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close browser page for {}: {}", url, e);
            }
        }
    }
}

impl Drop for OpenPage {
    fn drop(&mut self) {
        let Some(page) = self.0.take() else {
            return;
        };
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(e) = page.close().await {
                    tracing::debug!("Failed to close abandoned browser page: {}", e);
                }
            });
        }
    }
}

fn browser_error(url: &str, error: CdpError) -> FetchError {
    FetchError::Browser {
        url: url.to_string(),
        message: error.to_string(),
    }
}

/// Launches the browser and spawns the task that drives its event stream
async fn launch(
    executable: Option<PathBuf>,
    user_agent: &str,
    timeout: Duration,
) -> Result<Browser, String> {
    let executable = match executable.or_else(locate_browser) {
        Some(path) if path.exists() => path,
        Some(path) => {
            return Err(format!(
                "browser executable {} does not exist; {}",
                path.display(),
                INSTALL_HINT
            ))
        }
        None => return Err(format!("no Chromium found; {}", INSTALL_HINT)),
    };

    tracing::info!("Launching browser {}", executable.display());

    let config = BrowserConfig::builder()
        .chrome_executable(executable)
        .request_timeout(timeout)
        .arg(format!("--user-agent={}", user_agent))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--mute-audio")
        .build()?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| format!("failed to launch browser: {}", e))?;

    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::trace!("Browser handler error: {}", e);
            }
        }
        tracing::debug!("Browser handler task completed");
    });

    Ok(browser)
}

/// Finds a usable browser executable without downloading anything
///
/// `CHROME_EXECUTABLE` wins when it points at an existing file. Then the build
/// downloaded by `trawl install` is used, and finally the well-known install
/// locations are tried in order.
pub fn locate_browser() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(BROWSER_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!(
            "{} points to a missing file: {}",
            BROWSER_ENV,
            path.display()
        );
    }

    installed_browser(&cache_dir()).or_else(|| {
        KNOWN_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    })
}

/// Reads the executable recorded by a previous install into `dir`
fn installed_browser(dir: &Path) -> Option<PathBuf> {
    let recorded = std::fs::read_to_string(dir.join(INSTALLED_MARKER)).ok()?;
    let path = PathBuf::from(recorded.trim());
    path.exists().then_some(path)
}

/// Directory that holds the managed browser download
pub fn cache_dir() -> PathBuf {
    std::env::var_os(CACHE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("trawl-chromium"))
}

/// Downloads a managed Chromium build into the cache directory
///
/// An existing download is reused. Returns the path of the executable.
pub async fn install_browser() -> Result<PathBuf, TrawlError> {
    let dir = cache_dir();
    std::fs::create_dir_all(&dir)?;

    tracing::info!("Installing Chromium into {}", dir.display());

    let options = BrowserFetcherOptions::builder()
        .with_path(&dir)
        .build()
        .map_err(|e| TrawlError::Install(e.to_string()))?;

    let revision = BrowserFetcher::new(options)
        .fetch()
        .await
        .map_err(|e| TrawlError::Install(e.to_string()))?;

    std::fs::write(
        dir.join(INSTALLED_MARKER),
        revision.executable_path.to_string_lossy().as_bytes(),
    )?;

    tracing::info!(
        "Chromium installed at {}",
        revision.executable_path.display()
    );

    Ok(revision.executable_path)
}
