use super::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::time::Instant;

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

/// Returns a fixed result per platform and records every call.
#[derive(Default)]
struct FakeCounter {
    results: HashMap<&'static str, ExtractionResult>,
    calls: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeCounter {
    fn with(mut self, platform: &'static str, result: ExtractionResult) -> Self {
        self.results.insert(platform, result);
        self
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("lock").clone()
    }
}

impl FollowerCounter for FakeCounter {
    async fn follower_count(&self, platform: &str, url: &str) -> ExtractionResult {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls
            .lock()
            .expect("lock")
            .push((platform.to_string(), url.to_string()));

        tokio::time::sleep(Duration::from_millis(10)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.results
            .get(platform)
            .cloned()
            .unwrap_or_else(|| ExtractionResult::found(100))
    }
}

#[derive(Default)]
struct FakeStore {
    writes: Mutex<Vec<(i64, FollowerUpdate)>>,
    failing_ids: HashSet<i64>,
}

impl FakeStore {
    fn failing(ids: &[i64]) -> Self {
        Self {
            failing_ids: ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<(i64, FollowerUpdate)> {
        self.writes.lock().expect("lock").clone()
    }
}

impl FollowerStore for FakeStore {
    type Error = String;

    async fn save_follower_update(&self, id: i64, update: &FollowerUpdate) -> Result<(), String> {
        if self.failing_ids.contains(&id) {
            return Err(format!("connection reset while writing {id}"));
        }
        self.writes
            .lock()
            .expect("lock")
            .push((id, update.clone()));
        Ok(())
    }
}

fn config(max_concurrent: usize) -> BatchConfig {
    BatchConfig {
        max_concurrent,
        delay_between_batches: Duration::from_millis(2_500),
        failure_threshold: 0,
    }
}

#[tokio::test(start_paused = true)]
async fn mixed_platform_run_skips_unsupported_and_batches_the_rest() {
    let records = vec![
        record(1, Platform::Instagram, "https://www.instagram.com/creator/"),
        record(2, Platform::Youtube, "https://www.youtube.com/@creator"),
        record(3, Platform::Whatsapp, "https://wa.me/5511999999999"),
        record(4, Platform::Tiktok, "https://www.tiktok.com/@creator"),
        record(5, Platform::X, "https://x.com/creator"),
        record(6, Platform::Telegram, "https://t.me/creator"),
    ];
    let counter = FakeCounter::default();
    let store = FakeStore::default();

    let summary = update_all(&records, &counter, &store, &config(2)).await;

    assert_eq!(summary.considered, 6);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.delays, 1);
    assert_eq!(summary.written, 3);

    let platforms: Vec<String> = counter.calls().into_iter().map(|(p, _)| p).collect();
    assert!(!platforms
        .iter()
        .any(|p| matches!(p.as_str(), "whatsapp" | "x" | "telegram")));
    let mut written: Vec<i64> = store.writes().into_iter().map(|(id, _)| id).collect();
    written.sort_unstable();
    assert_eq!(written, vec![1, 2, 4]);
}

#[tokio::test(start_paused = true)]
async fn batch_count_is_ceiling_and_no_delay_after_last_chunk() {
    let records: Vec<_> = (1..=7)
        .map(|id| record(id, Platform::Instagram, "creator"))
        .collect();
    let counter = FakeCounter::default();
    let store = FakeStore::default();
    let start = Instant::now();

    let summary = update_all(&records, &counter, &store, &config(3)).await;

    assert_eq!(summary.batches, 3);
    assert_eq!(summary.delays, 2);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(5_000));
    assert!(elapsed < Duration::from_millis(7_500));
}

#[tokio::test(start_paused = true)]
async fn concurrency_never_exceeds_chunk_size() {
    let records: Vec<_> = (1..=6)
        .map(|id| record(id, Platform::Kwai, "@creator"))
        .collect();
    let counter = FakeCounter::default();
    let store = FakeStore::default();

    update_all(&records, &counter, &store, &config(2)).await;

    assert_eq!(counter.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn zero_concurrency_is_treated_as_one() {
    let records: Vec<_> = (1..=3)
        .map(|id| record(id, Platform::Threads, "creator"))
        .collect();
    let counter = FakeCounter::default();
    let store = FakeStore::default();

    let summary = update_all(&records, &counter, &store, &config(0)).await;

    assert_eq!(summary.batches, 3);
    assert_eq!(counter.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_urls_are_skipped() {
    let records = vec![
        record(1, Platform::Instagram, ""),
        record(2, Platform::Instagram, "   "),
        record(3, Platform::Instagram, "creator"),
    ];
    let counter = FakeCounter::default();
    let store = FakeStore::default();

    let summary = update_all(&records, &counter, &store, &config(2)).await;

    assert_eq!(summary.skipped, 2);
    assert_eq!(counter.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn errors_are_written_and_empty_results_are_not() {
    let records = vec![
        record(1, Platform::Instagram, "creator"),
        record(2, Platform::Facebook, "creator"),
    ];
    let counter = FakeCounter::default()
        .with("instagram", ExtractionResult::default())
        .with(
            "facebook",
            ExtractionResult::failed("Facebook: could not extract follower count"),
        );
    let store = FakeStore::default();

    let summary = update_all(&records, &counter, &store, &config(2)).await;

    assert_eq!(summary.empty_results, 1);
    assert_eq!(summary.written, 1);
    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    let (id, update) = &writes[0];
    assert_eq!(*id, 2);
    assert!(update.followers.is_none());
    assert_eq!(
        update.error.as_deref(),
        Some("Facebook: could not extract follower count")
    );
}

#[tokio::test(start_paused = true)]
async fn write_failure_does_not_stop_the_run() {
    let records: Vec<_> = (1..=4)
        .map(|id| record(id, Platform::Youtube, "@creator"))
        .collect();
    let counter = FakeCounter::default();
    let store = FakeStore::failing(&[2]);

    let summary = update_all(&records, &counter, &store, &config(2)).await;

    assert_eq!(summary.processed, 4);
    assert_eq!(summary.write_failures, 1);
    assert_eq!(summary.written, 3);
}

#[tokio::test(start_paused = true)]
async fn breaker_skips_platform_after_threshold() {
    let mut records: Vec<_> = (1..=5)
        .map(|id| record(id, Platform::Instagram, "creator"))
        .collect();
    records.push(record(6, Platform::Tiktok, "creator"));
    let counter = FakeCounter::default().with(
        "instagram",
        ExtractionResult::failed("Instagram: navigation timed out"),
    );
    let store = FakeStore::default();
    let config = BatchConfig {
        max_concurrent: 1,
        delay_between_batches: Duration::from_millis(100),
        failure_threshold: 2,
    };

    let summary = update_all(&records, &counter, &store, &config).await;

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.tripped, 3);
    assert_eq!(summary.batches, 3);
    let instagram_calls = counter
        .calls()
        .iter()
        .filter(|(platform, _)| platform == "instagram")
        .count();
    assert_eq!(instagram_calls, 2);
}

#[test]
fn success_resets_breaker_count() {
    let mut breaker = Breaker::new(2);
    breaker.observe(Platform::Tiktok, &ExtractionResult::failed("TikTok: timeout"));
    breaker.observe(Platform::Tiktok, &ExtractionResult::found(10));
    breaker.observe(Platform::Tiktok, &ExtractionResult::failed("TikTok: timeout"));
    assert!(!breaker.is_open(Platform::Tiktok));

    breaker.observe(Platform::Tiktok, &ExtractionResult::failed("TikTok: timeout"));
    assert!(breaker.is_open(Platform::Tiktok));
    assert!(!breaker.is_open(Platform::Kwai));
}

#[test]
fn zero_threshold_never_trips() {
    let mut breaker = Breaker::new(0);
    for _ in 0..10 {
        breaker.observe(Platform::Kwai, &ExtractionResult::failed("Kwai: timeout"));
    }
    assert!(!breaker.is_open(Platform::Kwai));
}

#[tokio::test]
async fn telegram_only_run_never_reaches_an_extractor() {
    let records = vec![
        record(1, Platform::Telegram, "https://t.me/creator"),
        record(2, Platform::Telegram, "creator"),
    ];
    let counter = FakeCounter::default();
    let store = FakeStore::default();

    let summary = update_all(&records, &counter, &store, &config(2)).await;

    assert_eq!(summary.considered, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.batches, 0);
    assert!(counter.calls().is_empty());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn empty_input_does_nothing() {
    let counter = FakeCounter::default();
    let store = FakeStore::default();

    let summary = update_all(&[], &counter, &store, &config(2)).await;

    assert_eq!(summary, BatchSummary::default());
    assert!(counter.calls().is_empty());
}
