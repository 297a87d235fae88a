use std::sync::LazyLock;

use regex::Regex;

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?twitch\.tv/([a-zA-Z0-9_]+)").expect("valid channel url regex")
});

/// Normalize a profile URL or a bare handle into the channel handle.
///
/// Anything that does not look like a profile URL is returned untouched;
/// bad handles surface later as "streamer not found".
pub fn resolve_channel(input: &str) -> &str {
    URL_REGEX
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_urls() {
        assert_eq!(resolve_channel("https://twitch.tv/alice"), "alice");
        assert_eq!(resolve_channel("https://www.twitch.tv/alice"), "alice");
        assert_eq!(resolve_channel("http://twitch.tv/Some_User42"), "Some_User42");
        assert_eq!(resolve_channel("https://www.twitch.tv/alice/videos"), "alice");
        assert_eq!(resolve_channel("https://twitch.tv/alice?referrer=raid"), "alice");
    }

    #[test]
    fn test_plain_input_is_unchanged() {
        assert_eq!(resolve_channel("bob"), "bob");
        assert_eq!(resolve_channel(""), "");
        assert_eq!(resolve_channel("https://example.com/alice"), "https://example.com/alice");
        assert_eq!(resolve_channel("twitch.tv/alice"), "twitch.tv/alice");
    }
}
