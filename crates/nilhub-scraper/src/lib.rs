pub mod browser;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod orchestrator;
pub mod rate_limit;
pub mod types;

pub use browser::{BrowserSession, BrowserSettings};
pub use error::ScrapeError;
pub use extract::PlatformScraper;
pub use orchestrator::{default_orchestrator, ScrapeOrchestrator};
pub use types::{ExtractionOutcome, ProfileScrape, RunSummary};
