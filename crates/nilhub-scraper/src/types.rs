use serde::Serialize;

/// What one extractor attempt produced for one profile.
///
/// Created per attempt and consumed immediately by the orchestrator; the
/// extractor contract is "never fail, always return an outcome" — any failure
/// is captured in `error` with zero-valued followers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionOutcome {
    /// 0 when no strategy yielded a positive count.
    pub followers: u64,
    /// Percentage in 0–100; `None` when no engagement signal was found.
    pub avg_engagement_rate: Option<f64>,
    /// Average views over the sampled content grid, where the platform has one.
    pub avg_views: Option<u64>,
    /// Non-empty means the attempt failed regardless of any populated
    /// numeric fields.
    pub error: Option<String>,
}

impl ExtractionOutcome {
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of scraping a single profile, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileScrape {
    pub success: bool,
    pub error: Option<String>,
}

impl ProfileScrape {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregate counts for one orchestrator run. Never persisted; returned to
/// the scheduler or admin caller and logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub success: u32,
    pub failed: u32,
}

impl RunSummary {
    pub fn record(&mut self, scrape: &ProfileScrape) {
        if scrape.success {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }
}
