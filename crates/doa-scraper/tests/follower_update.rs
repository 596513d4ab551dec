//! End-to-end follower refresh through the public API: real extractors and
//! dispatch, with a fixture renderer standing in for the browser and an
//! in-memory store standing in for the database.

use std::sync::Mutex;
use std::time::Duration;

use doa_core::{FollowerStore, FollowerUpdate, Platform, SocialNetworkRecord};
use doa_scraper::{
    update_all, BatchConfig, BrowserError, FollowerCountService, PageRenderer, RenderedPage,
};

/// Serves canned profile pages keyed by host.
struct FixtureRenderer;

impl PageRenderer for FixtureRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, BrowserError> {
        let html = if url.contains("instagram.com") {
            r#"<html><head><meta name="description" content="34 mil seguidores, 100 seguindo, 50 posts"></head></html>"#
        } else if url.contains("youtube.com") {
            r#"<html><body><script>var ytInitialData = {"subscriberCountText":{"simpleText":"1,2 mi de inscritos"}};</script></body></html>"#
        } else if url.contains("tiktok.com") {
            return Err(BrowserError::Timeout {
                url: url.to_string(),
                secs: 30,
            });
        } else {
            "<html><body></body></html>"
        };
        Ok(RenderedPage::from_html(url, html))
    }
}

#[derive(Default)]
struct MemoryStore {
    writes: Mutex<Vec<(i64, FollowerUpdate)>>,
}

impl FollowerStore for MemoryStore {
    type Error = std::convert::Infallible;

    async fn save_follower_update(
        &self,
        id: i64,
        update: &FollowerUpdate,
    ) -> Result<(), Self::Error> {
        self.writes
            .lock()
            .expect("lock")
            .push((id, update.clone()));
        Ok(())
    }
}

fn record(id: i64, platform: Platform, url: &str) -> SocialNetworkRecord {
    SocialNetworkRecord {
        id,
        platform,
        url: url.to_string(),
        username: "creator".to_string(),
        followers: None,
        followers_updated_at: None,
        update_error: None,
    }
}

#[tokio::test(start_paused = true)]
async fn five_record_run_updates_supported_platforms_only() {
    let records = vec![
        record(1, Platform::Instagram, "https://www.instagram.com/creator/"),
        record(2, Platform::Youtube, "@creator"),
        record(3, Platform::Whatsapp, "https://wa.me/5511999999999"),
        record(4, Platform::Tiktok, "creator"),
        record(5, Platform::X, "https://x.com/creator"),
    ];
    let service = FollowerCountService::new(FixtureRenderer);
    let store = MemoryStore::default();
    let config = BatchConfig {
        max_concurrent: 2,
        delay_between_batches: Duration::from_millis(2_500),
        failure_threshold: 0,
    };

    let summary = update_all(&records, &service, &store, &config).await;

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.delays, 1);
    assert_eq!(summary.skipped, 2);

    let mut writes = store.writes.lock().expect("lock").clone();
    writes.sort_by_key(|(id, _)| *id);
    let ids: Vec<i64> = writes.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![1, 2, 4]);

    assert_eq!(writes[0].1.followers, Some(34_000));
    assert!(writes[0].1.error.is_none());
    assert_eq!(writes[1].1.followers, Some(1_200_000));
    assert!(writes[2].1.followers.is_none());
    assert_eq!(
        writes[2].1.error.as_deref(),
        Some("TikTok: navigation to https://www.tiktok.com/@creator timed out after 30s")
    );
}
