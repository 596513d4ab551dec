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
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    /// Records scraped concurrently inside one batch.
    pub scraper_max_concurrent: usize,
    /// Pause between consecutive batches.
    pub scraper_batch_delay_ms: u64,
    /// Extra wait after navigation so client-side rendering can finish.
    pub scraper_settle_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    /// Consecutive failures per platform before the rest of the run skips it.
    /// `0` disables the breaker.
    pub scraper_failure_threshold: usize,
    pub chrome_executable: Option<String>,
    /// Set while the application is being built; no browser is launched.
    pub build_phase: bool,
    pub followers_cron: String,
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
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_concurrent", &self.scraper_max_concurrent)
            .field("scraper_batch_delay_ms", &self.scraper_batch_delay_ms)
            .field("scraper_settle_delay_ms", &self.scraper_settle_delay_ms)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("scraper_failure_threshold", &self.scraper_failure_threshold)
            .field("chrome_executable", &self.chrome_executable)
            .field("build_phase", &self.build_phase)
            .field("followers_cron", &self.followers_cron)
            .finish()
    }
}
