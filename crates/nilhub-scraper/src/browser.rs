//! Shared headless-browser session management.
//!
//! Each platform extractor owns one [`BrowserSession`]. The underlying
//! Chromium process is launched lazily on first use and reused across every
//! page load in a scrape run, amortising the expensive startup cost, while
//! each fetch still gets a fresh, isolated page context. Navigation is
//! bounded by a configurable timeout and failures surface as extraction
//! failures, never process crashes.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::ScrapeError;

const VIEWPORT_WIDTH: u32 = 1920;
const VIEWPORT_HEIGHT: u32 = 1080;

/// Browser behavior knobs, sourced from application config.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub user_agent: String,
    pub headless: bool,
    /// Upper bound on one navigation (connect + load event), in milliseconds.
    pub nav_timeout_ms: u64,
}

impl BrowserSettings {
    #[must_use]
    pub fn from_app_config(config: &nilhub_core::AppConfig) -> Self {
        Self {
            user_agent: config.scraper_user_agent.clone(),
            headless: config.scraper_headless,
            nav_timeout_ms: config.scrape_timeout_ms,
        }
    }
}

struct BrowserHandle {
    browser: Browser,
    event_task: JoinHandle<()>,
}

/// Owns at most one Chromium process, launched on first use.
pub struct BrowserSession {
    settings: BrowserSettings,
    state: Mutex<Option<BrowserHandle>>,
}

impl BrowserSession {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(None),
        }
    }

    /// Navigate a fresh page context to `url`, wait out `settle` to let
    /// client-side rendering finish, and return the rendered HTML.
    ///
    /// The page context is closed on every exit path, including errors.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the browser cannot be launched, the page
    /// cannot be opened, navigation fails or times out, or the rendered
    /// content cannot be read.
    pub async fn fetch_page_html(&self, url: &str, settle: Duration) -> Result<String, ScrapeError> {
        let page = self.open_page().await?;
        let result = self.load_page(&page, url, settle).await;
        if let Err(e) = page.close().await {
            tracing::debug!(url, error = %e, "failed to close page context");
        }
        result
    }

    /// Terminate the underlying browser process, if one was started.
    ///
    /// Idempotent; errors are logged and never escalated.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let Some(mut handle) = state.take() {
            if let Err(e) = handle.browser.close().await {
                tracing::warn!(error = %e, "failed to close browser cleanly");
            }
            let _ = handle.browser.wait().await;
            handle.event_task.abort();
            tracing::debug!("browser session closed");
        }
    }

    async fn open_page(&self) -> Result<Page, ScrapeError> {
        let mut state = self.state.lock().await;
        if state.is_none() {
            *state = Some(self.launch().await?);
        }
        let handle = state.as_mut().expect("browser launched above");
        handle
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::PageCreation(e.to_string()))
    }

    async fn launch(&self) -> Result<BrowserHandle, ScrapeError> {
        let headless_mode = if self.settings.headless {
            HeadlessMode::True
        } else {
            HeadlessMode::False
        };
        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
            .headless_mode(headless_mode)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-blink-features=AutomationControlled")
            .build()
            .map_err(ScrapeError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::BrowserLaunch(e.to_string()))?;

        // The handler stream must be drained for the CDP connection to make
        // progress; it lives as long as the browser process.
        let event_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        tracing::info!(
            headless = self.settings.headless,
            "launched shared browser process"
        );
        Ok(BrowserHandle {
            browser,
            event_task,
        })
    }

    async fn load_page(
        &self,
        page: &Page,
        url: &str,
        settle: Duration,
    ) -> Result<String, ScrapeError> {
        page.execute(SetUserAgentOverrideParams::new(
            self.settings.user_agent.clone(),
        ))
        .await
        .map_err(|e| ScrapeError::PageCreation(format!("user-agent override: {e}")))?;

        page.execute(
            SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(VIEWPORT_WIDTH))
                .height(i64::from(VIEWPORT_HEIGHT))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .expect("valid device metrics"),
        )
        .await
        .map_err(|e| ScrapeError::PageCreation(format!("viewport override: {e}")))?;

        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(Duration::from_millis(self.settings.nav_timeout_ms), navigation)
            .await
        {
            Err(_) => {
                return Err(ScrapeError::NavigationTimeout {
                    url: url.to_owned(),
                    timeout_ms: self.settings.nav_timeout_ms,
                })
            }
            Ok(Err(e)) => {
                return Err(ScrapeError::Navigation {
                    url: url.to_owned(),
                    reason: e.to_string(),
                })
            }
            Ok(Ok(())) => {}
        }

        // Load events alone are not enough on JS-heavy profile pages; give
        // client-side rendering a fixed window to settle before reading.
        tokio::time::sleep(settle).await;

        page.content().await.map_err(|e| ScrapeError::Content {
            url: url.to_owned(),
            reason: e.to_string(),
        })
    }
}
