//! YouTube channel extraction.
//!
//! Subscriber counts are read from the embedded `ytInitialData` payload when
//! present, otherwise from a free-text scan. View sampling is the expensive
//! part: the watch-page view count is not rendered on the channel grid, so
//! up to ten recent videos are opened individually and averaged.

use std::time::Duration;

use async_trait::async_trait;

use nilhub_core::Platform;

use super::{
    average_views, capture, capture_all, engagement_from_views, first_follower_count,
    normalize_handle, PlatformScraper, Strategy,
};
use crate::browser::{BrowserSession, BrowserSettings};
use crate::error::ScrapeError;
use crate::normalize::parse_count;
use crate::types::ExtractionOutcome;

const CHANNEL_SETTLE: Duration = Duration::from_secs(3);
const WATCH_SETTLE: Duration = Duration::from_secs(2);

/// Sample size over the channel's recent uploads.
const VIDEO_SAMPLE: usize = 10;

const SUBSCRIBER_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "initial-data",
        find: initial_data_count,
    },
    Strategy {
        name: "page-text",
        find: page_text_count,
    },
];

fn initial_data_count(html: &str) -> Option<String> {
    capture(html, r#""simpleText":"([^"]+) subscribers""#)
}

fn page_text_count(html: &str) -> Option<String> {
    capture(html, r"(?i)([\d.,]+\s?[KMB]?)\s+subscribers")
}

fn watch_paths(html: &str) -> Vec<String> {
    capture_all(html, r#""(/watch\?v=[A-Za-z0-9_-]{11})""#, VIDEO_SAMPLE)
}

fn watch_view_count(html: &str) -> Option<u64> {
    let raw = capture(html, r#""viewCount":"(\d+)""#)
        .or_else(|| capture(html, r"(?i)([\d.,]+\s?[KMB]?)\s+views"))?;
    let views = parse_count(&raw);
    (views > 0).then_some(views)
}

pub struct YouTubeScraper {
    session: BrowserSession,
}

impl YouTubeScraper {
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            session: BrowserSession::new(settings),
        }
    }

    async fn try_extract(&self, handle: &str) -> Result<ExtractionOutcome, ScrapeError> {
        let handle = normalize_handle(handle);
        let url = format!("https://www.youtube.com/@{handle}");
        let html = self.session.fetch_page_html(&url, CHANNEL_SETTLE).await?;

        let Some(followers) =
            first_follower_count(Platform::YouTube, &html, SUBSCRIBER_STRATEGIES)
        else {
            tracing::warn!(handle, "no subscriber strategy matched youtube channel");
            return Ok(ExtractionOutcome::default());
        };

        let avg_views = self.sample_video_views(handle).await;
        let avg_engagement_rate = avg_views
            .and_then(|avg| engagement_from_views(Platform::YouTube, handle, avg, followers));

        Ok(ExtractionOutcome {
            followers,
            avg_engagement_rate,
            avg_views,
            error: None,
        })
    }

    /// Visit up to [`VIDEO_SAMPLE`] recent uploads and average their views.
    ///
    /// Failures on individual videos are logged and skipped; an unreachable
    /// uploads page just means no view data for this run.
    async fn sample_video_views(&self, handle: &str) -> Option<u64> {
        let url = format!("https://www.youtube.com/@{handle}/videos");
        let html = match self.session.fetch_page_html(&url, CHANNEL_SETTLE).await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(handle, error = %e, "uploads page fetch failed");
                return None;
            }
        };

        let mut samples = Vec::new();
        for path in watch_paths(&html) {
            let watch_url = format!("https://www.youtube.com{path}");
            match self.session.fetch_page_html(&watch_url, WATCH_SETTLE).await {
                Ok(watch_html) => {
                    if let Some(views) = watch_view_count(&watch_html) {
                        samples.push(views);
                    } else {
                        tracing::debug!(handle, path, "no view count on watch page");
                    }
                }
                Err(e) => {
                    tracing::debug!(handle, path, error = %e, "watch page fetch failed");
                }
            }
        }
        average_views(&samples)
    }
}

#[async_trait]
impl PlatformScraper for YouTubeScraper {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn extract(&self, handle: &str) -> ExtractionOutcome {
        match self.try_extract(handle).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(handle, error = %e, "youtube extraction failed");
                ExtractionOutcome::failure(e.to_string())
            }
        }
    }

    async fn shutdown(&self) {
        self.session.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_data_subscriber_count() {
        let html = r#"<script>"subscriberCountText":{"simpleText":"1.21M subscribers"}</script>"#;
        assert_eq!(
            first_follower_count(Platform::YouTube, html, SUBSCRIBER_STRATEGIES),
            Some(1_210_000)
        );
    }

    #[test]
    fn free_text_subscriber_fallback() {
        let html = "<span>40.2K subscribers</span>";
        assert_eq!(
            first_follower_count(Platform::YouTube, html, SUBSCRIBER_STRATEGIES),
            Some(40_200)
        );
    }

    #[test]
    fn watch_paths_dedupe_and_cap_at_ten() {
        let mut html = String::new();
        for i in 0..15 {
            let id = format!("{i:0>11}");
            let path = format!("/watch?v={id}");
            // Each link appears twice, as on the real grid (thumbnail + title).
            html.push_str(&format!(r#""{path}" "{path}" "#));
        }
        let paths = watch_paths(&html);
        assert_eq!(paths.len(), VIDEO_SAMPLE);
        assert_eq!(paths[0], "/watch?v=00000000000");
    }

    #[test]
    fn watch_view_count_prefers_exact_payload() {
        let html = r#"<script>"viewCount":"482113"</script><span>482K views</span>"#;
        assert_eq!(watch_view_count(html), Some(482_113));
    }

    #[test]
    fn watch_view_count_falls_back_to_rendered_text() {
        let html = "<span>12,004 views</span>";
        assert_eq!(watch_view_count(html), Some(12_004));
    }

    #[test]
    fn watch_view_count_absent() {
        assert_eq!(watch_view_count("<body>premiere soon</body>"), None);
    }
}
