//! Match-key derivation from donation-page URLs.

/// Derive a form slug from a donation-page URL.
///
/// The slug is everything after the first occurrence of `prefix`. Returns
/// `None` when the URL is empty, does not contain the prefix, or the
/// remainder would be empty, so callers can uphold the non-empty match-key
/// invariant by construction.
pub fn derive_match_key(source_url: &str, prefix: &str) -> Option<String> {
    if source_url.is_empty() || prefix.is_empty() {
        return None;
    }

    let idx = source_url.find(prefix)?;
    let remainder = &source_url[idx + prefix.len()..];
    if remainder.is_empty() {
        return None;
    }

    Some(remainder.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://give.example.org/donate/";

    #[test]
    fn strips_prefix_and_keeps_remainder() {
        let key = derive_match_key("https://give.example.org/donate/alpha", PREFIX);
        assert_eq!(key.as_deref(), Some("alpha"));
    }

    #[test]
    fn remainder_may_contain_further_path_segments() {
        let key = derive_match_key("https://give.example.org/donate/alpha/2024", PREFIX);
        assert_eq!(key.as_deref(), Some("alpha/2024"));
    }

    #[test]
    fn empty_url_is_discarded() {
        assert_eq!(derive_match_key("", PREFIX), None);
    }

    #[test]
    fn url_without_prefix_is_discarded() {
        assert_eq!(derive_match_key("https://example.com/other", PREFIX), None);
    }

    #[test]
    fn prefix_with_empty_remainder_is_discarded() {
        assert_eq!(derive_match_key(PREFIX, PREFIX), None);
    }

    #[test]
    fn strips_only_the_first_occurrence() {
        let url = format!("{PREFIX}{PREFIX}");
        assert_eq!(derive_match_key(&url, PREFIX).as_deref(), Some(PREFIX));
    }
}
