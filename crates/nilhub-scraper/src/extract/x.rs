//! X (Twitter) profile extraction.
//!
//! Follower counts come from the profile header's followers link, the
//! embedded state payload, or a free-text scan. No secondary metrics are
//! attempted: the signals needed for engagement are unreachable without
//! authenticated API access, so the caller substitutes a flat estimate
//! whenever followers were found.

use std::time::Duration;

use async_trait::async_trait;

use nilhub_core::Platform;

use super::{
    capture, first_follower_count, normalize_handle, select_first_text, PlatformScraper, Strategy,
};
use crate::browser::{BrowserSession, BrowserSettings};
use crate::error::ScrapeError;
use crate::types::ExtractionOutcome;

const PROFILE_SETTLE: Duration = Duration::from_secs(4);

const FOLLOWER_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "followers-link",
        find: followers_link_count,
    },
    Strategy {
        name: "state-payload",
        find: state_follower_count,
    },
    Strategy {
        name: "page-text",
        find: page_text_count,
    },
];

/// The header links the follower count to the verified-followers page.
fn followers_link_count(html: &str) -> Option<String> {
    let text = select_first_text(html, r#"a[href$="/verified_followers"]"#)?;
    capture(&text, r"(?i)([\d.,]+\s?[KMB]?)\s*Followers")
}

fn state_follower_count(html: &str) -> Option<String> {
    capture(html, r#""followers_count":(\d+)"#)
}

fn page_text_count(html: &str) -> Option<String> {
    capture(html, r"(?i)([\d.,]+\s?[KMB]?)\s*Followers")
}

pub struct XScraper {
    session: BrowserSession,
}

impl XScraper {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            session: BrowserSession::new(settings),
        }
    }

    async fn try_extract(&self, handle: &str) -> Result<ExtractionOutcome, ScrapeError> {
        let handle = normalize_handle(handle);
        let url = format!("https://x.com/{handle}");
        let html = self.session.fetch_page_html(&url, PROFILE_SETTLE).await?;

        let Some(followers) = first_follower_count(Platform::X, &html, FOLLOWER_STRATEGIES) else {
            tracing::warn!(handle, "no follower strategy matched x profile");
            return Ok(ExtractionOutcome::default());
        };

        Ok(ExtractionOutcome {
            followers,
            avg_engagement_rate: None,
            avg_views: None,
            error: None,
        })
    }
}

#[async_trait]
impl PlatformScraper for XScraper {
    fn platform(&self) -> Platform {
        Platform::X
    }

    async fn extract(&self, handle: &str) -> ExtractionOutcome {
        match self.try_extract(handle).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(handle, error = %e, "x extraction failed");
                ExtractionOutcome::failure(e.to_string())
            }
        }
    }

    async fn shutdown(&self) {
        self.session.close().await;
    }
}
