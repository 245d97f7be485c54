use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("failed to open a page context: {0}")]
    PageCreation(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("could not read rendered content for {url}: {reason}")]
    Content { url: String, reason: String },
}
