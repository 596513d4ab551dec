//! Platform dispatch for follower-count extraction.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use doa_core::{ExtractionResult, Platform};
use futures::FutureExt;

use crate::extract::{PageRenderer, PlatformExtractor};

/// Anything that can produce an [`ExtractionResult`] for a profile link.
///
/// Implementations never fail: every problem is reported in the result.
pub trait FollowerCounter: Sync {
    fn follower_count(
        &self,
        platform: &str,
        url: &str,
    ) -> impl Future<Output = ExtractionResult> + Send;
}

/// Routes a `(platform, url)` pair to the matching extractor.
#[derive(Debug, Clone)]
pub struct FollowerCountService<R> {
    renderer: R,
}

impl<R: PageRenderer> FollowerCountService<R> {
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Extracts the follower count for one link.
    ///
    /// Unknown and unsupported platforms yield
    /// `"platform not supported: <name>"`. A panic inside an extractor is
    /// caught and reported as an error result.
    pub async fn get_follower_count(&self, platform: &str, url: &str) -> ExtractionResult {
        let extractor = platform
            .parse::<Platform>()
            .ok()
            .and_then(PlatformExtractor::for_platform);
        let Some(extractor) = extractor else {
            return ExtractionResult::failed(format!("platform not supported: {platform}"));
        };

        match AssertUnwindSafe(extractor.extract(&self.renderer, url))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(platform, url, "extractor panicked");
                ExtractionResult::failed(format!(
                    "{}: unexpected extraction failure",
                    extractor.platform().label()
                ))
            }
        }
    }
}

impl<R: PageRenderer> FollowerCounter for FollowerCountService<R> {
    async fn follower_count(&self, platform: &str, url: &str) -> ExtractionResult {
        self.get_follower_count(platform, url).await
    }
}
