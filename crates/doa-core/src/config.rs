use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not load `.env` files. Useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("DOA_ENV", "development"))?;

    let bind_addr = parse("DOA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("DOA_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("DOA_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("DOA_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "DOA_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("DOA_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("DOA_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("DOA_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_concurrent = parse_usize("DOA_SCRAPER_MAX_CONCURRENT", "2")?;
    if scraper_max_concurrent == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DOA_SCRAPER_MAX_CONCURRENT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let scraper_batch_delay_ms = parse_u64("DOA_SCRAPER_BATCH_DELAY_MS", "2500")?;
    let scraper_settle_delay_ms = parse_u64("DOA_SCRAPER_SETTLE_DELAY_MS", "2500")?;
    let scraper_max_retries = parse_u32("DOA_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_secs = parse_u64("DOA_SCRAPER_RETRY_BACKOFF_BASE_SECS", "1")?;
    let scraper_failure_threshold = parse_usize("DOA_SCRAPER_FAILURE_THRESHOLD", "0")?;

    let chrome_executable = lookup("DOA_CHROME_EXECUTABLE")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let build_phase = parse_flag(&or_default("DOA_BUILD_PHASE", "false"));
    let followers_cron = or_default("DOA_FOLLOWERS_CRON", "0 0 */6 * * *");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_concurrent,
        scraper_batch_delay_ms,
        scraper_settle_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_failure_threshold,
        chrome_executable,
        build_phase,
        followers_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DOA_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Interpret a boolean-ish env value. Anything other than the usual truthy
/// spellings is `false`.
fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
