use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Global kill switch. When false every scrape entry point short-circuits
    /// without touching the store or the browser.
    pub scraping_enabled: bool,
    /// Upper bound on a single page navigation, in milliseconds.
    pub scrape_timeout_ms: u64,
    pub scraper_user_agent: String,
    pub scraper_headless: bool,
    /// Minimum spacing between requests to the same platform, in milliseconds.
    pub scrape_delay_ms: u64,
    /// Six-field cron expression for the recurring full scrape run.
    pub scrape_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("scraping_enabled", &self.scraping_enabled)
            .field("scrape_timeout_ms", &self.scrape_timeout_ms)
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_headless", &self.scraper_headless)
            .field("scrape_delay_ms", &self.scrape_delay_ms)
            .field("scrape_cron", &self.scrape_cron)
            .finish()
    }
}
