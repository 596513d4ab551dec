//! The shared headless browser.
//!
//! One browser process serves every profile page. [`BrowserSession`] owns it
//! lazily and relaunches it after a disconnect; [`ChromeLauncher`] is the
//! production launcher and [`ChromeRenderer`] turns a URL into a
//! [`crate::RenderedPage`].

use std::future::Future;

use thiserror::Error;

mod chrome;
mod session;

pub use chrome::{ChromeBrowser, ChromeLauncher, ChromeRenderer, PageOptions};
pub use session::BrowserSession;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser is unavailable during the build phase")]
    BuildPhase,

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("page error: {0}")]
    Page(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
}

/// A running browser that may be shared between concurrent page loads.
pub trait BrowserHandle: Send + Sync + 'static {
    /// `false` once the underlying connection has dropped.
    fn is_connected(&self) -> bool;

    /// Shuts the browser down. Errors are logged, not returned.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Starts new browser processes for a [`BrowserSession`].
pub trait BrowserLauncher: Send + Sync {
    type Handle: BrowserHandle;

    fn launch(&self) -> impl Future<Output = Result<Self::Handle, BrowserError>> + Send;
}
