//! Instagram profile extraction.
//!
//! Follower counts come from (in order) the `og:description` meta tag — the
//! most reliable source since it is server-rendered — then the exact-count
//! `title` attribute in the profile header, then a free-text scan of the
//! rendered page. Engagement is measured from the like count of the first
//! visible post when reachable; like counts are frequently hidden without
//! authentication, so the caller substitutes a follower-bracket estimate
//! when this yields nothing.

use std::time::Duration;

use async_trait::async_trait;

use nilhub_core::Platform;

use super::{
    capture, first_follower_count, normalize_handle, select_first_attr, PlatformScraper, Strategy,
};
use crate::browser::{BrowserSession, BrowserSettings};
use crate::error::ScrapeError;
use crate::normalize::parse_count;
use crate::types::ExtractionOutcome;

const PROFILE_SETTLE: Duration = Duration::from_secs(3);
const POST_SETTLE: Duration = Duration::from_secs(3);

const FOLLOWER_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "og-description",
        find: og_description_count,
    },
    Strategy {
        name: "header-title-attr",
        find: header_title_count,
    },
    Strategy {
        name: "page-text",
        find: page_text_count,
    },
];

fn og_description_count(html: &str) -> Option<String> {
    let content = select_first_attr(html, r#"meta[property="og:description"]"#, "content")?;
    capture(&content, r"(?i)([\d.,]+\s?[KMB]?)\s+followers")
}

/// Instagram renders the abbreviated count as text but keeps the exact count
/// in the `title` attribute of the header span.
fn header_title_count(html: &str) -> Option<String> {
    select_first_attr(html, "header section span[title]", "title")
}

fn page_text_count(html: &str) -> Option<String> {
    capture(html, r"(?i)([\d.,]+\s?[KMB]?)\s*followers")
}

fn first_post_path(html: &str) -> Option<String> {
    capture(html, r#"href="(/p/[A-Za-z0-9_-]+/?)""#)
}

fn like_count(html: &str) -> Option<u64> {
    let raw = capture(html, r"(?i)([\d.,]+\s?[KMB]?)\s+likes")?;
    let likes = parse_count(&raw);
    (likes > 0).then_some(likes)
}

pub struct InstagramScraper {
    session: BrowserSession,
}

impl InstagramScraper {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            session: BrowserSession::new(settings),
        }
    }

    async fn try_extract(&self, handle: &str) -> Result<ExtractionOutcome, ScrapeError> {
        let handle = normalize_handle(handle);
        let url = format!("https://www.instagram.com/{handle}/");
        let html = self.session.fetch_page_html(&url, PROFILE_SETTLE).await?;

        let Some(followers) = first_follower_count(Platform::Instagram, &html, FOLLOWER_STRATEGIES)
        else {
            tracing::warn!(handle, "no follower strategy matched instagram profile");
            return Ok(ExtractionOutcome::default());
        };

        let avg_engagement_rate = self.measure_engagement(handle, &html, followers).await;

        Ok(ExtractionOutcome {
            followers,
            avg_engagement_rate,
            avg_views: None,
            error: None,
        })
    }

    /// Open the first visible post and derive engagement from its like count.
    ///
    /// Returns `None` when no post link is visible, the post page cannot be
    /// loaded, no like count is rendered, or the ratio falls outside (0, 100) —
    /// in all of those cases the orchestrator falls back to the bracket
    /// estimate instead.
    #[allow(clippy::cast_precision_loss)]
    async fn measure_engagement(
        &self,
        handle: &str,
        profile_html: &str,
        followers: u64,
    ) -> Option<f64> {
        let post_path = first_post_path(profile_html)?;
        let url = format!("https://www.instagram.com{post_path}");

        let html = match self.session.fetch_page_html(&url, POST_SETTLE).await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(handle, error = %e, "first-post fetch failed");
                return None;
            }
        };

        let likes = like_count(&html)?;
        let rate = likes as f64 / followers as f64 * 100.0;
        if rate > 0.0 && rate < 100.0 {
            Some(rate)
        } else {
            tracing::warn!(handle, rate, likes, followers, "implausible like ratio discarded");
            None
        }
    }
}

#[async_trait]
impl PlatformScraper for InstagramScraper {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn extract(&self, handle: &str) -> ExtractionOutcome {
        match self.try_extract(handle).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(handle, error = %e, "instagram extraction failed");
                ExtractionOutcome::failure(e.to_string())
            }
        }
    }

    async fn shutdown(&self) {
        self.session.close().await;
    }
}
