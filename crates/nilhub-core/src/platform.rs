use serde::{Deserialize, Serialize};

/// Social platform a profile lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    TikTok,
    YouTube,
    X,
}

impl Platform {
    /// Parse a platform name as stored on a profile record.
    ///
    /// Matching is case-insensitive; `"twitter"` is accepted as an alias for
    /// [`Platform::X`] since older profile rows predate the rename.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Some(Self::Instagram),
            "tiktok" => Some(Self::TikTok),
            "youtube" => Some(Self::YouTube),
            "x" | "twitter" => Some(Self::X),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::TikTok => "tiktok",
            Self::YouTube => "youtube",
            Self::X => "x",
        }
    }

    /// Heuristic engagement-rate estimate (percent) for a profile where no
    /// engagement signal could be extracted.
    ///
    /// Instagram uses a tiered estimate by follower bracket — like counts are
    /// frequently hidden or unreachable without authentication, so a bracket
    /// average is substituted rather than reporting nothing. X always gets a
    /// flat 1.0: its engagement signals require authenticated API access.
    /// TikTok and YouTube return `None`; their view-based engagement is
    /// derived from sampled content or not at all.
    #[must_use]
    pub fn fallback_engagement_rate(self, followers: u64) -> Option<f64> {
        match self {
            Self::Instagram => {
                let rate = if followers < 10_000 {
                    4.0
                } else if followers < 100_000 {
                    2.5
                } else if followers < 1_000_000 {
                    1.5
                } else {
                    0.75
                };
                Some(rate)
            }
            Self::X => Some(1.0),
            Self::TikTok | Self::YouTube => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scrape lifecycle state persisted on each social profile.
///
/// `Pending` is set optimistically before an attempt and is always resolved
/// to `Success` or `Failed` by the time the attempt returns. Both terminal
/// states are revisited on the next scheduled run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapingStatus {
    Idle,
    Pending,
    Success,
    Failed,
}

impl ScrapingStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Parse a stored status string. Unrecognised values map to `Idle`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "success" => Self::Success,
            "failed" => Self::Failed,
            _ => Self::Idle,
        }
    }
}
