//! Scrape run orchestration.
//!
//! Owns the registry of platform extractors and drives the per-profile
//! lifecycle: `idle/failed/success → pending → success|failed`. `pending` is
//! set optimistically before the attempt and always resolved before
//! `scrape_profile` returns. No failure on one profile is allowed to abort a
//! run — the aggregate summary is the only signal returned to the caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use nilhub_core::{AppConfig, MetricsStore, Platform, ProfileMetrics, ProfileRef};

use crate::browser::BrowserSettings;
use crate::extract::{
    InstagramScraper, PlatformScraper, TikTokScraper, XScraper, YouTubeScraper,
};
use crate::rate_limit::RateGate;
use crate::types::{ProfileScrape, RunSummary};

/// Failure reason surfaced when the global kill switch is off.
pub const DISABLED_ERROR: &str = "Scraping is disabled";

pub struct ScrapeOrchestrator {
    store: Arc<dyn MetricsStore>,
    scrapers: HashMap<Platform, Arc<dyn PlatformScraper>>,
    gate: RateGate,
    enabled: bool,
    /// At most one full run at a time; scheduled and admin triggers serialize.
    run_lock: Mutex<()>,
    shutdown: watch::Sender<bool>,
}

impl ScrapeOrchestrator {
    #[must_use]
    pub fn new(store: Arc<dyn MetricsStore>, enabled: bool, request_interval: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            store,
            scrapers: HashMap::new(),
            gate: RateGate::new(request_interval),
            enabled,
            run_lock: Mutex::new(()),
            shutdown,
        }
    }

    pub fn register(&mut self, scraper: Arc<dyn PlatformScraper>) {
        self.scrapers.insert(scraper.platform(), scraper);
    }

    /// Scrape one profile and resolve its persisted status.
    ///
    /// Dispatch failures (kill switch, unknown platform) return before any
    /// store write or navigation; the profile keeps its previous status.
    pub async fn scrape_profile(&self, profile: &ProfileRef) -> ProfileScrape {
        if !self.enabled {
            return ProfileScrape::failure(DISABLED_ERROR);
        }

        let Some(scraper) = Platform::parse(&profile.platform)
            .and_then(|platform| self.scrapers.get(&platform))
        else {
            tracing::warn!(
                platform = %profile.platform,
                handle = %profile.handle,
                "no scraper registered for platform"
            );
            return ProfileScrape::failure(format!(
                "no scraper for platform: {}",
                profile.platform
            ));
        };
        let platform = scraper.platform();

        if let Err(e) = self.store.mark_pending(profile.id).await {
            tracing::error!(profile_id = %profile.id, error = %e, "failed to mark profile pending");
            return ProfileScrape::failure(format!("store error: {e}"));
        }

        self.gate.wait(platform).await;
        let outcome = scraper.extract(&profile.handle).await;

        if let Some(error) = outcome.error {
            if let Err(e) = self.store.record_failure(profile.id, &error).await {
                tracing::error!(profile_id = %profile.id, error = %e, "failed to record scrape failure");
            }
            return ProfileScrape::failure(error);
        }

        // Substitute the platform's heuristic estimate when extraction found
        // followers but no engagement signal.
        let avg_engagement_rate = match outcome.avg_engagement_rate {
            Some(rate) => Some(rate),
            None if outcome.followers > 0 => platform.fallback_engagement_rate(outcome.followers),
            None => None,
        };

        let metrics = ProfileMetrics {
            followers: i64::try_from(outcome.followers).unwrap_or(i64::MAX),
            avg_engagement_rate,
            avg_views: outcome
                .avg_views
                .map(|v| i64::try_from(v).unwrap_or(i64::MAX)),
        };

        if let Err(e) = self.store.record_success(profile.id, metrics).await {
            tracing::error!(profile_id = %profile.id, error = %e, "failed to record scrape success");
            let message = format!("store error: {e}");
            // Resolve the optimistic `pending` so the profile is not stuck.
            if let Err(e) = self.store.record_failure(profile.id, &message).await {
                tracing::error!(profile_id = %profile.id, error = %e, "failed to resolve pending status");
            }
            return ProfileScrape::failure(message);
        }

        // Derived value, recomputed eagerly rather than maintained
        // incrementally; a failed recompute does not fail the scrape.
        if let Err(e) = self.store.recompute_athlete_reach(profile.athlete_id).await {
            tracing::warn!(
                athlete_id = %profile.athlete_id,
                error = %e,
                "aggregate reach recompute failed"
            );
        }

        tracing::info!(
            %platform,
            handle = %profile.handle,
            followers = metrics.followers,
            "profile scraped"
        );
        ProfileScrape::ok()
    }

    /// Scrape every profile with a non-empty handle, serially.
    pub async fn scrape_all_profiles(&self) -> RunSummary {
        if !self.enabled {
            tracing::warn!("scraping is disabled; skipping run");
            return RunSummary::default();
        }
        let _run = self.run_lock.lock().await;
        let profiles = match self.store.scrapeable_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::error!(error = %e, "failed to load scrapeable profiles");
                return RunSummary::default();
            }
        };
        self.run(profiles).await
    }

    /// Same as [`Self::scrape_all_profiles`], scoped to one athlete.
    pub async fn scrape_profiles_for_athlete(&self, athlete_id: Uuid) -> RunSummary {
        if !self.enabled {
            tracing::warn!("scraping is disabled; skipping run");
            return RunSummary::default();
        }
        let _run = self.run_lock.lock().await;
        let profiles = match self.store.profiles_for_athlete(athlete_id).await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::error!(%athlete_id, error = %e, "failed to load athlete profiles");
                return RunSummary::default();
            }
        };
        self.run(profiles).await
    }

    async fn run(&self, profiles: Vec<ProfileRef>) -> RunSummary {
        let shutdown = self.shutdown.subscribe();
        let mut summary = RunSummary::default();
        tracing::info!(count = profiles.len(), "starting scrape run");

        for (index, profile) in profiles.iter().enumerate() {
            if *shutdown.borrow() {
                tracing::warn!(
                    remaining = profiles.len() - index,
                    "scrape run aborted by shutdown"
                );
                break;
            }
            let scrape = self.scrape_profile(profile).await;
            summary.record(&scrape);
        }

        tracing::info!(
            success = summary.success,
            failed = summary.failed,
            "scrape run complete"
        );
        summary
    }

    /// Ask an in-flight run to stop after the current profile instead of
    /// waiting out its remaining delays.
    pub fn request_shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Close every held browser session. The only coordinated shutdown path,
    /// meant to be invoked at process exit.
    pub async fn cleanup(&self) {
        self.request_shutdown();
        for scraper in self.scrapers.values() {
            scraper.shutdown().await;
        }
        tracing::info!("all browser sessions closed");
    }
}

/// Build an orchestrator with all four platform extractors registered,
/// each owning its own browser session configured from `config`.
#[must_use]
pub fn default_orchestrator(store: Arc<dyn MetricsStore>, config: &AppConfig) -> ScrapeOrchestrator {
    let settings = BrowserSettings::from_app_config(config);
    let mut orchestrator = ScrapeOrchestrator::new(
        store,
        config.scraping_enabled,
        Duration::from_millis(config.scrape_delay_ms),
    );
    orchestrator.register(Arc::new(InstagramScraper::new(settings.clone())));
    orchestrator.register(Arc::new(TikTokScraper::new(settings.clone())));
    orchestrator.register(Arc::new(YouTubeScraper::new(settings.clone())));
    orchestrator.register(Arc::new(XScraper::new(settings)));
    orchestrator
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
