use std::sync::LazyLock;

use doa_core::Platform;
use regex::Regex;
use scraper::Selector;

use super::profile_url::{classify, ProfileInput};
use super::{count_before, first_capture, leading_count, PlatformExtractor, RenderedPage, Strategy};
use crate::html::{element_text, meta_contents};

pub(super) const EXTRACTOR: PlatformExtractor = PlatformExtractor {
    platform: Platform::Kwai,
    normalize: normalize_url,
    strategies: &[
        Strategy {
            name: "fans_element",
            find: fans_element,
        },
        Strategy {
            name: "meta_description",
            find: meta_description,
        },
        Strategy {
            name: "visible_text",
            find: visible_text,
        },
    ],
};

const HOSTS: &[&str] = &["kwai.com", "kw.ai"];

static FANS: LazyLock<Regex> =
    LazyLock::new(|| count_before("fãs|fans|followers|seguidores"));
static FANS_ELEMENT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="fans"], [class*="follower"]"#).expect("valid selector")
});

/// Kwai share links (`kw.ai/...`) and profile URLs are used as given.
fn normalize_url(input: &str) -> Option<String> {
    match classify(input, HOSTS)? {
        ProfileInput::Url(mut url) => {
            if url.path().trim_matches('/').is_empty() || url.set_scheme("https").is_err() {
                return None;
            }
            Some(url.to_string())
        }
        ProfileInput::Handle(handle) => Some(format!("https://www.kwai.com/@{handle}")),
    }
}

/// Profile headers render counts in elements such as
/// `<div class="user-fans-count">12,3K</div>`.
fn fans_element(page: &RenderedPage) -> Option<String> {
    let document = page.document();
    document
        .select(&FANS_ELEMENT)
        .find_map(|el| leading_count(&element_text(el)))
}

fn meta_description(page: &RenderedPage) -> Option<String> {
    meta_contents(&page.document(), &["description", "og:description"])
        .iter()
        .find_map(|content| first_capture(&FANS, content))
}

fn visible_text(page: &RenderedPage) -> Option<String> {
    first_capture(&FANS, &page.text)
}
