//! TikTok profile extraction.
//!
//! TikTok tags its counters with stable `data-e2e` attributes, so the
//! selector strategies lead; the embedded hydration state and a free-text
//! scan back them up. Average views are read inline from the first few
//! items of the video grid — no per-video navigation needed.

use std::time::Duration;

use async_trait::async_trait;

use nilhub_core::Platform;

use super::{
    average_views, capture, engagement_from_views, first_follower_count, normalize_handle,
    select_first_text, select_texts, PlatformScraper, Strategy,
};
use crate::browser::{BrowserSession, BrowserSettings};
use crate::error::ScrapeError;
use crate::normalize::parse_count;
use crate::types::ExtractionOutcome;

/// TikTok hydrates slowly; give the grid time to render.
const PROFILE_SETTLE: Duration = Duration::from_secs(5);

/// Sample size over the profile's video grid.
const VIEW_SAMPLE: usize = 5;

const FOLLOWER_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "followers-count-strong",
        find: followers_strong,
    },
    Strategy {
        name: "followers-count-any",
        find: followers_any,
    },
    Strategy {
        name: "hydration-state",
        find: hydration_follower_count,
    },
    Strategy {
        name: "page-text",
        find: page_text_count,
    },
];

fn followers_strong(html: &str) -> Option<String> {
    select_first_text(html, r#"strong[data-e2e="followers-count"]"#)
}

fn followers_any(html: &str) -> Option<String> {
    select_first_text(html, r#"[data-e2e="followers-count"]"#)
}

fn hydration_follower_count(html: &str) -> Option<String> {
    capture(html, r#""followerCount":(\d+)"#)
}

fn page_text_count(html: &str) -> Option<String> {
    capture(html, r"(?i)([\d.,]+\s?[KMB]?)\s*Followers")
}

/// Per-item view counts rendered inline on the video grid.
fn grid_view_counts(html: &str) -> Vec<u64> {
    select_texts(html, r#"strong[data-e2e="video-views"]"#, VIEW_SAMPLE)
        .iter()
        .map(|raw| parse_count(raw))
        .filter(|n| *n > 0)
        .collect()
}

pub struct TikTokScraper {
    session: BrowserSession,
}

impl TikTokScraper {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            session: BrowserSession::new(settings),
        }
    }

    async fn try_extract(&self, handle: &str) -> Result<ExtractionOutcome, ScrapeError> {
        let handle = normalize_handle(handle);
        let url = format!("https://www.tiktok.com/@{handle}");
        let html = self.session.fetch_page_html(&url, PROFILE_SETTLE).await?;

        let Some(followers) = first_follower_count(Platform::TikTok, &html, FOLLOWER_STRATEGIES)
        else {
            tracing::warn!(handle, "no follower strategy matched tiktok profile");
            return Ok(ExtractionOutcome::default());
        };

        let samples = grid_view_counts(&html);
        let avg_views = average_views(&samples);
        let avg_engagement_rate = avg_views
            .and_then(|avg| engagement_from_views(Platform::TikTok, handle, avg, followers));

        Ok(ExtractionOutcome {
            followers,
            avg_engagement_rate,
            avg_views,
            error: None,
        })
    }
}

#[async_trait]
impl PlatformScraper for TikTokScraper {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    async fn extract(&self, handle: &str) -> ExtractionOutcome {
        match self.try_extract(handle).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(handle, error = %e, "tiktok extraction failed");
                ExtractionOutcome::failure(e.to_string())
            }
        }
    }

    async fn shutdown(&self) {
        self.session.close().await;
    }
}
