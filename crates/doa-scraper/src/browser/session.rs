use std::sync::Arc;

use tokio::sync::Mutex;

use super::{BrowserError, BrowserHandle, BrowserLauncher};

/// Lazily-launched, process-wide browser.
///
/// Concurrent callers of [`BrowserSession::get_browser`] receive the same
/// handle. A disconnected handle is replaced on the next call. During the
/// build phase no browser is ever launched.
pub struct BrowserSession<L: BrowserLauncher> {
    launcher: L,
    build_phase: bool,
    current: Mutex<Option<Arc<L::Handle>>>,
}

impl<L: BrowserLauncher> BrowserSession<L> {
    #[must_use]
    pub fn new(launcher: L, build_phase: bool) -> Self {
        Self {
            launcher,
            build_phase,
            current: Mutex::new(None),
        }
    }

    /// Returns the live browser, launching one if none is connected.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::BuildPhase`] when running inside a build, or
    /// the launcher's error if a new browser cannot be started.
    pub async fn get_browser(&self) -> Result<Arc<L::Handle>, BrowserError> {
        if self.build_phase {
            return Err(BrowserError::BuildPhase);
        }

        let mut current = self.current.lock().await;
        if let Some(handle) = current.as_ref() {
            if handle.is_connected() {
                return Ok(Arc::clone(handle));
            }
            tracing::warn!("shared browser disconnected, relaunching");
            if let Some(stale) = current.take() {
                stale.close().await;
            }
        }

        let handle = Arc::new(self.launcher.launch().await?);
        *current = Some(Arc::clone(&handle));
        tracing::info!("launched shared headless browser");
        Ok(handle)
    }

    /// Closes the browser if one is running. Safe to call repeatedly.
    pub async fn close_browser(&self) {
        let handle = self.current.lock().await.take();
        if let Some(handle) = handle {
            handle.close().await;
            tracing::info!("closed shared headless browser");
        }
    }

    #[cfg(test)]
    async fn is_running(&self) -> bool {
        self.current
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| handle.is_connected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeHandle {
        connected: AtomicBool,
        closes: AtomicUsize,
    }

    impl BrowserHandle for FakeHandle {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
            self.connected.store(false, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeLauncher {
        launches: AtomicUsize,
    }

    impl BrowserLauncher for FakeLauncher {
        type Handle = FakeHandle;

        async fn launch(&self) -> Result<FakeHandle, BrowserError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(FakeHandle {
                connected: AtomicBool::new(true),
                closes: AtomicUsize::new(0),
            })
        }
    }

    struct FailingLauncher;

    impl BrowserLauncher for FailingLauncher {
        type Handle = FakeHandle;

        async fn launch(&self) -> Result<FakeHandle, BrowserError> {
            Err(BrowserError::Launch("chrome not found".to_string()))
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_browser() {
        let session = BrowserSession::new(FakeLauncher::default(), false);

        let (a, b) = tokio::join!(session.get_browser(), session.get_browser());
        let (a, b) = (a.expect("first"), b.expect("second"));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(session.launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disconnected_browser_is_relaunched() {
        let session = BrowserSession::new(FakeLauncher::default(), false);

        let first = session.get_browser().await.expect("launch");
        first.connected.store(false, Ordering::SeqCst);
        let second = session.get_browser().await.expect("relaunch");

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(session.launcher.launches.load(Ordering::SeqCst), 2);
        assert_eq!(first.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn build_phase_never_launches() {
        let session = BrowserSession::new(FakeLauncher::default(), true);

        let err = session.get_browser().await.expect_err("build phase");

        assert!(matches!(err, BrowserError::BuildPhase));
        assert_eq!(session.launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let session = BrowserSession::new(FakeLauncher::default(), false);
        let handle = session.get_browser().await.expect("launch");

        session.close_browser().await;
        session.close_browser().await;

        assert_eq!(handle.closes.load(Ordering::SeqCst), 1);
        assert!(!session.is_running().await);
    }

    #[tokio::test]
    async fn close_without_browser_is_a_no_op() {
        let session = BrowserSession::new(FakeLauncher::default(), false);
        session.close_browser().await;
        assert_eq!(session.launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn launch_failure_is_reported_and_retried_next_call() {
        let session = BrowserSession::new(FailingLauncher, false);
        assert!(matches!(
            session.get_browser().await,
            Err(BrowserError::Launch(_))
        ));
        assert!(!session.is_running().await);
    }
}
