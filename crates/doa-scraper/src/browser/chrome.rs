use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use doa_core::AppConfig;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{BrowserError, BrowserHandle, BrowserLauncher, BrowserSession};
use crate::extract::{PageRenderer, RenderedPage};

/// Resource types aborted before they hit the network.
const BLOCKED_RESOURCES: [ResourceType; 4] = [
    ResourceType::Image,
    ResourceType::Stylesheet,
    ResourceType::Font,
    ResourceType::Media,
];

const INNER_TEXT: &str = "document.body ? document.body.innerText : ''";

/// Launches headless Chrome with container-friendly flags.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    executable: Option<String>,
    request_timeout: Duration,
}

impl ChromeLauncher {
    #[must_use]
    pub fn new(executable: Option<String>, request_timeout: Duration) -> Self {
        Self {
            executable,
            request_timeout,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.chrome_executable.clone(),
            Duration::from_secs(config.scraper_request_timeout_secs),
        )
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Handle = ChromeBrowser;

    async fn launch(&self) -> Result<ChromeBrowser, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .request_timeout(self.request_timeout);
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The stream ends when the CDP connection closes.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler error");
                }
            }
        });

        Ok(ChromeBrowser {
            browser: Mutex::new(browser),
            handler,
        })
    }
}

/// A running Chrome process and its CDP event loop.
pub struct ChromeBrowser {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
}

impl ChromeBrowser {
    async fn new_page(&self) -> Result<Page, BrowserError> {
        self.browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))
    }
}

impl BrowserHandle for ChromeBrowser {
    fn is_connected(&self) -> bool {
        !self.handler.is_finished()
    }

    async fn close(&self) {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "browser close error");
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "browser wait error");
        }
        self.handler.abort();
    }
}

/// Per-page rendering settings.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    /// Pause after load so client-side rendering can settle.
    pub settle_delay: Duration,
}

impl PageOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.scraper_user_agent.clone(),
            navigation_timeout: Duration::from_secs(config.scraper_request_timeout_secs),
            settle_delay: Duration::from_millis(config.scraper_settle_delay_ms),
        }
    }
}

/// Renders profile pages in fresh tabs of the shared browser.
#[derive(Clone)]
pub struct ChromeRenderer {
    session: Arc<BrowserSession<ChromeLauncher>>,
    options: PageOptions,
}

impl ChromeRenderer {
    #[must_use]
    pub fn new(session: Arc<BrowserSession<ChromeLauncher>>, options: PageOptions) -> Self {
        Self { session, options }
    }

    async fn load(&self, page: &Page, url: &str) -> Result<RenderedPage, BrowserError> {
        page.execute(SetUserAgentOverrideParams::new(
            self.options.user_agent.clone(),
        ))
        .await
        .map_err(|e| BrowserError::Page(e.to_string()))?;

        match tokio::time::timeout(self.options.navigation_timeout, page.goto(url)).await {
            Err(_) => {
                return Err(BrowserError::Timeout {
                    url: url.to_string(),
                    secs: self.options.navigation_timeout.as_secs(),
                })
            }
            Ok(Err(e)) => {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Ok(Ok(_)) => {}
        }

        tokio::time::sleep(self.options.settle_delay).await;

        let html = page
            .content()
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))?;
        let text = page
            .evaluate(INNER_TEXT)
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))?
            .into_value::<String>()
            .unwrap_or_default();

        Ok(RenderedPage::new(url, html, text))
    }
}

impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, BrowserError> {
        let browser = self.session.get_browser().await?;
        let page = browser.new_page().await?;

        let interceptor = match block_heavy_resources(&page).await {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::debug!(url, error = %e, "resource blocking unavailable");
                None
            }
        };

        let result = self.load(&page, url).await;

        if let Some(task) = interceptor {
            task.abort();
        }
        if let Err(e) = page.close().await {
            tracing::debug!(url, error = %e, "page close error");
        }

        result
    }
}

/// Aborts image, stylesheet, font and media requests for `page`.
async fn block_heavy_resources(page: &Page) -> Result<JoinHandle<()>, BrowserError> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| BrowserError::Page(e.to_string()))?;

    let patterns = BLOCKED_RESOURCES.into_iter().map(|resource_type| {
        RequestPattern::builder()
            .resource_type(resource_type)
            .request_stage(RequestStage::Request)
            .build()
    });
    page.execute(EnableParams::builder().patterns(patterns).build())
        .await
        .map_err(|e| BrowserError::Page(e.to_string()))?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let abort = FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
            if let Err(e) = page.execute(abort).await {
                tracing::trace!(error = %e, "failed to abort blocked request");
            }
        }
    }))
}
