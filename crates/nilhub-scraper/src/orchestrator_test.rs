use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use nilhub_core::ScrapingStatus;

use super::*;
use crate::types::ExtractionOutcome;

// -----------------------------------------------------------------------
// in-memory store
// -----------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
struct ProfileState {
    status: Option<ScrapingStatus>,
    metrics: Option<ProfileMetrics>,
    error: Option<String>,
}

#[derive(Default)]
struct MockStore {
    profiles: Vec<ProfileRef>,
    states: std::sync::Mutex<HashMap<Uuid, ProfileState>>,
    writes: AtomicU32,
    reach_recomputes: std::sync::Mutex<Vec<Uuid>>,
}

impl MockStore {
    fn with_profiles(profiles: Vec<ProfileRef>) -> Self {
        Self {
            profiles,
            ..Self::default()
        }
    }

    fn state(&self, profile_id: Uuid) -> ProfileState {
        self.states
            .lock()
            .unwrap()
            .get(&profile_id)
            .cloned()
            .unwrap_or_default()
    }

    fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsStore for MockStore {
    async fn scrapeable_profiles(&self) -> anyhow::Result<Vec<ProfileRef>> {
        Ok(self.profiles.clone())
    }

    async fn profiles_for_athlete(&self, athlete_id: Uuid) -> anyhow::Result<Vec<ProfileRef>> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.athlete_id == athlete_id)
            .cloned()
            .collect())
    }

    async fn mark_pending(&self, profile_id: Uuid) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut states = self.states.lock().unwrap();
        let state = states.entry(profile_id).or_default();
        state.status = Some(ScrapingStatus::Pending);
        state.error = None;
        Ok(())
    }

    async fn record_success(
        &self,
        profile_id: Uuid,
        metrics: ProfileMetrics,
    ) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut states = self.states.lock().unwrap();
        let state = states.entry(profile_id).or_default();
        state.status = Some(ScrapingStatus::Success);
        state.metrics = Some(metrics);
        state.error = None;
        Ok(())
    }

    async fn record_failure(&self, profile_id: Uuid, error: &str) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut states = self.states.lock().unwrap();
        let state = states.entry(profile_id).or_default();
        state.status = Some(ScrapingStatus::Failed);
        state.error = Some(error.to_owned());
        Ok(())
    }

    async fn recompute_athlete_reach(&self, athlete_id: Uuid) -> anyhow::Result<()> {
        self.reach_recomputes.lock().unwrap().push(athlete_id);
        Ok(())
    }
}

// -----------------------------------------------------------------------
// counting extractor mock
// -----------------------------------------------------------------------

struct MockScraper {
    platform: Platform,
    outcome: ExtractionOutcome,
    calls: AtomicU32,
}

impl MockScraper {
    fn returning(platform: Platform, outcome: ExtractionOutcome) -> Arc<Self> {
        Arc::new(Self {
            platform,
            outcome,
            calls: AtomicU32::new(0),
        })
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformScraper for MockScraper {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn extract(&self, _handle: &str) -> ExtractionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }

    async fn shutdown(&self) {}
}

fn profile(athlete_id: Uuid, platform: &str, handle: &str) -> ProfileRef {
    ProfileRef {
        id: Uuid::new_v4(),
        athlete_id,
        platform: platform.to_owned(),
        handle: handle.to_owned(),
    }
}

fn followers_outcome(followers: u64) -> ExtractionOutcome {
    ExtractionOutcome {
        followers,
        ..ExtractionOutcome::default()
    }
}

fn orchestrator_with<S: MetricsStore + 'static>(
    store: Arc<S>,
    enabled: bool,
    scrapers: Vec<Arc<MockScraper>>,
) -> ScrapeOrchestrator {
    let mut orchestrator = ScrapeOrchestrator::new(store, enabled, Duration::ZERO);
    for scraper in scrapers {
        orchestrator.register(scraper);
    }
    orchestrator
}

// -----------------------------------------------------------------------
// tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn repeated_scrapes_leave_identical_metrics() {
    let athlete = Uuid::new_v4();
    let p = profile(athlete, "instagram", "@a");
    let store = Arc::new(MockStore::with_profiles(vec![p.clone()]));
    let scraper = MockScraper::returning(
        Platform::Instagram,
        ExtractionOutcome {
            followers: 5_000,
            avg_engagement_rate: Some(3.3),
            ..ExtractionOutcome::default()
        },
    );
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![scraper]);

    assert!(orchestrator.scrape_profile(&p).await.success);
    let first = store.state(p.id);
    assert!(orchestrator.scrape_profile(&p).await.success);
    let second = store.state(p.id);

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(second.status, Some(ScrapingStatus::Success));
    assert_eq!(second.error, None);
}

#[tokio::test]
async fn one_bad_profile_does_not_abort_the_run() {
    let athlete = Uuid::new_v4();
    // Profiles 2 and 4 hit the failing platform.
    let profiles = vec![
        profile(athlete, "instagram", "@p1"),
        profile(athlete, "tiktok", "@p2"),
        profile(athlete, "instagram", "@p3"),
        profile(athlete, "tiktok", "@p4"),
        profile(athlete, "instagram", "@p5"),
    ];
    let store = Arc::new(MockStore::with_profiles(profiles.clone()));
    let ok = MockScraper::returning(Platform::Instagram, followers_outcome(1_000));
    let bad = MockScraper::returning(Platform::TikTok, ExtractionOutcome::failure("boom"));
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![ok, bad]);

    let summary = orchestrator.scrape_all_profiles().await;
    assert_eq!(summary, RunSummary { success: 3, failed: 2 });

    for (index, p) in profiles.iter().enumerate() {
        let state = store.state(p.id);
        if index % 2 == 0 {
            assert_eq!(state.status, Some(ScrapingStatus::Success), "profile {index}");
            assert_eq!(state.error, None);
        } else {
            assert_eq!(state.status, Some(ScrapingStatus::Failed), "profile {index}");
            assert_eq!(state.error.as_deref(), Some("boom"));
        }
    }
}

#[tokio::test]
async fn kill_switch_short_circuits_without_navigation_or_writes() {
    let p = profile(Uuid::new_v4(), "instagram", "@a");
    let store = Arc::new(MockStore::with_profiles(vec![p.clone()]));
    let scraper = MockScraper::returning(Platform::Instagram, followers_outcome(1));
    let orchestrator =
        orchestrator_with(Arc::clone(&store), false, vec![Arc::clone(&scraper)]);

    let scrape = orchestrator.scrape_profile(&p).await;
    assert_eq!(scrape, ProfileScrape::failure("Scraping is disabled"));
    assert_eq!(scraper.call_count(), 0);
    assert_eq!(store.write_count(), 0);

    let summary = orchestrator.scrape_all_profiles().await;
    assert_eq!(summary, RunSummary::default());
    assert_eq!(scraper.call_count(), 0);
}

#[tokio::test]
async fn unknown_platform_fails_without_store_writes() {
    let p = profile(Uuid::new_v4(), "myspace", "@x");
    let store = Arc::new(MockStore::with_profiles(vec![p.clone()]));
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![]);

    let scrape = orchestrator.scrape_profile(&p).await;
    assert!(!scrape.success);
    assert!(scrape.error.unwrap().contains("myspace"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn missing_engagement_gets_bracket_estimate() {
    let p = profile(Uuid::new_v4(), "instagram", "@mid");
    let store = Arc::new(MockStore::with_profiles(vec![p.clone()]));
    let scraper = MockScraper::returning(Platform::Instagram, followers_outcome(50_000));
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![scraper]);

    assert!(orchestrator.scrape_profile(&p).await.success);
    let metrics = store.state(p.id).metrics.unwrap();
    assert_eq!(metrics.avg_engagement_rate, Some(2.5));
}

#[tokio::test]
async fn measured_engagement_is_not_overwritten_by_estimate() {
    let p = profile(Uuid::new_v4(), "instagram", "@measured");
    let store = Arc::new(MockStore::with_profiles(vec![p.clone()]));
    let scraper = MockScraper::returning(
        Platform::Instagram,
        ExtractionOutcome {
            followers: 50_000,
            avg_engagement_rate: Some(7.25),
            ..ExtractionOutcome::default()
        },
    );
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![scraper]);

    assert!(orchestrator.scrape_profile(&p).await.success);
    let metrics = store.state(p.id).metrics.unwrap();
    assert_eq!(metrics.avg_engagement_rate, Some(7.25));
}

#[tokio::test]
async fn x_profiles_get_flat_estimate() {
    let p = profile(Uuid::new_v4(), "x", "@flat");
    let store = Arc::new(MockStore::with_profiles(vec![p.clone()]));
    let scraper = MockScraper::returning(Platform::X, followers_outcome(1_000));
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![scraper]);

    assert!(orchestrator.scrape_profile(&p).await.success);
    let metrics = store.state(p.id).metrics.unwrap();
    assert_eq!(metrics.avg_engagement_rate, Some(1.0));
}

#[tokio::test]
async fn zero_follower_outcome_persists_no_estimate() {
    let p = profile(Uuid::new_v4(), "instagram", "@ghost");
    let store = Arc::new(MockStore::with_profiles(vec![p.clone()]));
    let scraper = MockScraper::returning(Platform::Instagram, followers_outcome(0));
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![scraper]);

    assert!(orchestrator.scrape_profile(&p).await.success);
    let metrics = store.state(p.id).metrics.unwrap();
    assert_eq!(metrics.followers, 0);
    assert_eq!(metrics.avg_engagement_rate, None);
}

#[tokio::test]
async fn successful_scrape_recomputes_athlete_reach() {
    let athlete = Uuid::new_v4();
    let p = profile(athlete, "instagram", "@a");
    let store = Arc::new(MockStore::with_profiles(vec![p.clone()]));
    let scraper = MockScraper::returning(Platform::Instagram, followers_outcome(123));
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![scraper]);

    assert!(orchestrator.scrape_profile(&p).await.success);
    assert_eq!(*store.reach_recomputes.lock().unwrap(), vec![athlete]);
}

#[tokio::test]
async fn end_to_end_mixed_run() {
    let athlete = Uuid::new_v4();
    let a = profile(athlete, "instagram", "@a");
    let b = profile(athlete, "tiktok", "@b");
    let c = profile(athlete, "myspace", "@c");
    let store = Arc::new(MockStore::with_profiles(vec![
        a.clone(),
        b.clone(),
        c.clone(),
    ]));
    let instagram = MockScraper::returning(Platform::Instagram, followers_outcome(5_000));
    let tiktok = MockScraper::returning(Platform::TikTok, ExtractionOutcome::failure("timeout"));
    let orchestrator = orchestrator_with(Arc::clone(&store), true, vec![instagram, tiktok]);

    let summary = orchestrator.scrape_all_profiles().await;
    assert_eq!(summary, RunSummary { success: 1, failed: 2 });

    let a_state = store.state(a.id);
    assert_eq!(a_state.status, Some(ScrapingStatus::Success));
    // 5 000 followers falls in the under-10K bracket.
    assert_eq!(a_state.metrics.unwrap().avg_engagement_rate, Some(4.0));

    let b_state = store.state(b.id);
    assert_eq!(b_state.status, Some(ScrapingStatus::Failed));
    assert_eq!(b_state.error.as_deref(), Some("timeout"));

    // The unsupported profile was never written.
    let c_state = store.state(c.id);
    assert_eq!(c_state.status, None);
}

#[tokio::test]
async fn per_athlete_run_scopes_to_that_athlete() {
    let athlete = Uuid::new_v4();
    let other = Uuid::new_v4();
    let mine = profile(athlete, "instagram", "@mine");
    let theirs = profile(other, "instagram", "@theirs");
    let store = Arc::new(MockStore::with_profiles(vec![mine.clone(), theirs.clone()]));
    let scraper = MockScraper::returning(Platform::Instagram, followers_outcome(10));
    let orchestrator =
        orchestrator_with(Arc::clone(&store), true, vec![Arc::clone(&scraper)]);

    let summary = orchestrator.scrape_profiles_for_athlete(athlete).await;
    assert_eq!(summary, RunSummary { success: 1, failed: 0 });
    assert_eq!(scraper.call_count(), 1);
    assert_eq!(store.state(theirs.id).status, None);
}

#[tokio::test]
async fn shutdown_aborts_a_run_before_it_starts_profiles() {
    let p = profile(Uuid::new_v4(), "instagram", "@a");
    let store = Arc::new(MockStore::with_profiles(vec![p]));
    let scraper = MockScraper::returning(Platform::Instagram, followers_outcome(1));
    let orchestrator =
        orchestrator_with(Arc::clone(&store), true, vec![Arc::clone(&scraper)]);

    orchestrator.request_shutdown();
    let summary = orchestrator.scrape_all_profiles().await;
    assert_eq!(summary, RunSummary::default());
    assert_eq!(scraper.call_count(), 0);
}

#[tokio::test]
async fn store_failure_on_pending_surfaces_as_profile_failure() {
    struct FailingStore;

    #[async_trait]
    impl MetricsStore for FailingStore {
        async fn scrapeable_profiles(&self) -> anyhow::Result<Vec<ProfileRef>> {
            Ok(vec![])
        }
        async fn profiles_for_athlete(&self, _: Uuid) -> anyhow::Result<Vec<ProfileRef>> {
            Ok(vec![])
        }
        async fn mark_pending(&self, _: Uuid) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
        async fn record_success(&self, _: Uuid, _: ProfileMetrics) -> anyhow::Result<()> {
            Ok(())
        }
        async fn record_failure(&self, _: Uuid, _: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn recompute_athlete_reach(&self, _: Uuid) -> anyhow::Result<()> {
            Ok(())
        }
    }

    let p = profile(Uuid::new_v4(), "instagram", "@a");
    let scraper = MockScraper::returning(Platform::Instagram, followers_outcome(1));
    let orchestrator =
        orchestrator_with_store(Arc::new(FailingStore), vec![Arc::clone(&scraper)]);

    let scrape = orchestrator.scrape_profile(&p).await;
    assert!(!scrape.success);
    assert!(scrape.error.unwrap().contains("connection refused"));
    assert_eq!(scraper.call_count(), 0);
}

fn orchestrator_with_store(
    store: Arc<dyn MetricsStore>,
    scrapers: Vec<Arc<MockScraper>>,
) -> ScrapeOrchestrator {
    let mut orchestrator = ScrapeOrchestrator::new(store, true, Duration::ZERO);
    for scraper in scrapers {
        orchestrator.register(scraper);
    }
    orchestrator
}
