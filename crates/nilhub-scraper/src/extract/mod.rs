//! Platform extractors.
//!
//! One extractor per platform, all sharing the same contract: `extract` never
//! fails — every error is captured into the returned outcome — and follower
//! counts are found by trying an ordered list of strategies, stopping at the
//! first that yields a positive count. Strategies are pure functions over
//! rendered HTML so the fallback chain is testable without a browser.

mod instagram;
mod tiktok;
mod x;
mod youtube;

pub use instagram::InstagramScraper;
pub use tiktok::TikTokScraper;
pub use x::XScraper;
pub use youtube::YouTubeScraper;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};

use nilhub_core::Platform;

use crate::normalize::parse_count;
use crate::types::ExtractionOutcome;

/// A platform-specific scraper driving a shared browser session.
#[async_trait]
pub trait PlatformScraper: Send + Sync {
    fn platform(&self) -> Platform;

    /// Extract metrics for one handle. Never fails: navigation and
    /// extraction errors are captured into [`ExtractionOutcome::error`]
    /// with zero-valued followers.
    async fn extract(&self, handle: &str) -> ExtractionOutcome;

    /// Close the held browser session. Idempotent.
    async fn shutdown(&self);
}

/// One attempt to read a raw follower-count string from rendered HTML.
pub(crate) struct Strategy {
    pub name: &'static str,
    pub find: fn(&str) -> Option<String>,
}

/// Evaluate `strategies` in order and return the first positive count.
///
/// Intermediate misses are logged at debug rather than swallowed silently;
/// only total exhaustion returns `None`.
pub(crate) fn first_follower_count(
    platform: Platform,
    html: &str,
    strategies: &[Strategy],
) -> Option<u64> {
    for strategy in strategies {
        match (strategy.find)(html) {
            Some(raw) => {
                let count = parse_count(&raw);
                if count > 0 {
                    tracing::debug!(
                        %platform,
                        strategy = strategy.name,
                        raw,
                        count,
                        "follower strategy matched"
                    );
                    return Some(count);
                }
                tracing::debug!(
                    %platform,
                    strategy = strategy.name,
                    raw,
                    "follower strategy matched text but yielded no positive count"
                );
            }
            None => {
                tracing::debug!(%platform, strategy = strategy.name, "follower strategy missed");
            }
        }
    }
    None
}

/// Strip a leading `@` and surrounding whitespace from a stored handle.
pub(crate) fn normalize_handle(handle: &str) -> &str {
    handle.trim().trim_start_matches('@')
}

/// Text content of the first element matching `css`, whitespace-collapsed.
pub(crate) fn select_first_text(html: &str, css: &str) -> Option<String> {
    let selector = Selector::parse(css).expect("valid selector");
    let document = Html::parse_document(html);
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Attribute value of the first element matching `css`.
pub(crate) fn select_first_attr(html: &str, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).expect("valid selector");
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .find_map(|el| el.value().attr(attr))
        .map(str::to_owned)
}

/// Text content of up to `limit` elements matching `css`.
pub(crate) fn select_texts(html: &str, css: &str, limit: usize) -> Vec<String> {
    let selector = Selector::parse(css).expect("valid selector");
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .take(limit)
        .filter_map(|el| {
            let text = el.text().collect::<Vec<_>>().join(" ");
            let text = text.trim().to_owned();
            (!text.is_empty()).then_some(text)
        })
        .collect()
}

/// First capture group of `pattern` against `haystack`.
pub(crate) fn capture(haystack: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).expect("valid regex");
    re.captures(haystack)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Up to `limit` distinct first-capture-group matches, in document order.
pub(crate) fn capture_all(haystack: &str, pattern: &str, limit: usize) -> Vec<String> {
    let re = Regex::new(pattern).expect("valid regex");
    let mut seen = Vec::new();
    for cap in re.captures_iter(haystack) {
        if let Some(m) = cap.get(1) {
            let value = m.as_str().to_owned();
            if !seen.contains(&value) {
                seen.push(value);
                if seen.len() == limit {
                    break;
                }
            }
        }
    }
    seen
}

/// Average of sampled per-item view counts. Saturates rather than
/// overflowing on absurd rendered counts.
pub(crate) fn average_views(samples: &[u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    let sum = samples.iter().fold(0u64, |acc, &v| acc.saturating_add(v));
    Some(sum / samples.len() as u64)
}

/// Engagement rate derived from average views, discarded when implausible.
///
/// A ratio of 100 % or more is treated as an artifact of malformed
/// extraction, logged as a warning and dropped.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn engagement_from_views(
    platform: Platform,
    handle: &str,
    avg_views: u64,
    followers: u64,
) -> Option<f64> {
    if followers == 0 {
        return None;
    }
    let rate = avg_views as f64 / followers as f64 * 100.0;
    if rate >= 100.0 {
        tracing::warn!(
            %platform,
            handle,
            rate,
            avg_views,
            followers,
            "implausible view-derived engagement rate discarded"
        );
        return None;
    }
    Some(rate)
}
