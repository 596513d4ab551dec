//! Offline unit tests for doa-db pool configuration and row types.
//! These tests do not require a live database connection.

use doa_core::{AppConfig, Environment, Platform};
use doa_db::{PoolConfig, SocialNetworkRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_max_concurrent: 2,
        scraper_batch_delay_ms: 2500,
        scraper_settle_delay_ms: 2500,
        scraper_max_retries: 2,
        scraper_retry_backoff_base_secs: 1,
        scraper_failure_threshold: 0,
        chrome_executable: None,
        build_phase: false,
        followers_cron: "0 0 */6 * * *".to_string(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`SocialNetworkRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn social_network_row_has_expected_fields() {
    use chrono::Utc;

    let row = SocialNetworkRow {
        id: 1_i64,
        profile_id: 5_i64,
        platform: "instagram".to_string(),
        url: "https://www.instagram.com/creator/".to_string(),
        username: "creator".to_string(),
        display_order: 0_i32,
        followers: Some(1_200_i64),
        followers_updated_at: Some(Utc::now()),
        update_error: None,
    };

    let record = row.into_record().expect("instagram row converts");
    assert_eq!(record.id, 1);
    assert_eq!(record.platform, Platform::Instagram);
    assert_eq!(record.username, "creator");
    assert_eq!(record.followers, Some(1_200));
    assert!(record.update_error.is_none());
}
