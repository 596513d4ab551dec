//! Classification of user-supplied profile input.

use reqwest::Url;

const MAX_HANDLE_LEN: usize = 100;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ProfileInput {
    /// An http(s) URL whose host belongs to the platform.
    Url(Url),
    /// A bare handle, with any leading `@` removed.
    Handle(String),
}

/// Classifies `input` as a platform URL or a bare handle.
///
/// Returns `None` for blank input, URLs on foreign hosts, non-http schemes
/// and handles with characters outside `[A-Za-z0-9._-]`.
pub(crate) fn classify(input: &str, hosts: &[&str]) -> Option<ProfileInput> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains("://") {
        let url = Url::parse(input).ok()?;
        return is_platform_url(&url, hosts).then_some(ProfileInput::Url(url));
    }

    if let Ok(url) = Url::parse(&format!("https://{input}")) {
        if is_platform_url(&url, hosts) {
            return Some(ProfileInput::Url(url));
        }
    }
    if input.contains('/') {
        return None;
    }

    let handle = input.strip_prefix('@').unwrap_or(input);
    is_valid_handle(handle).then(|| ProfileInput::Handle(handle.to_string()))
}

fn is_platform_url(url: &Url, hosts: &[&str]) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    hosts
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{h}")))
}

pub(crate) fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle.len() <= MAX_HANDLE_LEN
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Non-empty path segments of `url`.
pub(crate) fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// The handle in the first path segment, without a leading `@`.
pub(crate) fn first_segment_handle(url: &Url) -> Option<String> {
    let first = *segments(url).first()?;
    let handle = first.strip_prefix('@').unwrap_or(first);
    is_valid_handle(handle).then(|| handle.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTS: &[&str] = &["instagram.com"];

    #[test]
    fn full_url_on_platform_host() {
        let Some(ProfileInput::Url(url)) = classify("https://www.instagram.com/creator/", HOSTS)
        else {
            panic!("expected url");
        };
        assert_eq!(first_segment_handle(&url).as_deref(), Some("creator"));
    }

    #[test]
    fn scheme_less_url_is_accepted() {
        assert!(matches!(
            classify("instagram.com/creator", HOSTS),
            Some(ProfileInput::Url(_))
        ));
    }

    #[test]
    fn dotted_handle_is_not_mistaken_for_a_host() {
        assert_eq!(
            classify("john.doe", HOSTS),
            Some(ProfileInput::Handle("john.doe".to_string()))
        );
    }

    #[test]
    fn at_prefix_is_stripped() {
        assert_eq!(
            classify(" @creator ", HOSTS),
            Some(ProfileInput::Handle("creator".to_string()))
        );
    }

    #[test]
    fn foreign_hosts_and_bad_input_are_rejected() {
        assert!(classify("https://evil-instagram.com/creator", HOSTS).is_none());
        assert!(classify("https://example.com/creator", HOSTS).is_none());
        assert!(classify("ftp://instagram.com/creator", HOSTS).is_none());
        assert!(classify("example.com/creator", HOSTS).is_none());
        assert!(classify("", HOSTS).is_none());
        assert!(classify("   ", HOSTS).is_none());
        assert!(classify("not a handle", HOSTS).is_none());
    }
}
