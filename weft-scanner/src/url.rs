//! URL canonicalization for crawl bookkeeping.
//!
//! Every URL that enters the frontier or the link graph goes through
//! [`normalize`] first, so that the visited set and the persisted snapshots
//! agree on a single spelling per page.

use url::Url;

/// Canonicalize a raw URL string.
///
/// Trims surrounding whitespace, lowercases the whole string, strips one
/// leading `www.`, defaults the scheme to `https://` when none of
/// `http://`/`https://` is present, and removes trailing slashes.
///
/// The result is idempotent: `normalize(normalize(s)) == normalize(s)`.
///
/// Note that lowercasing applies to the entire string, path and query
/// included. Servers with case-sensitive paths will see a different URL than
/// the one that was linked. This is intentional: one canonical spelling per
/// page matters more here than byte-faithful paths.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    let stripped = trimmed.strip_prefix("www.").unwrap_or(&trimmed);

    let with_scheme = if stripped.starts_with("http://") || stripped.starts_with("https://") {
        stripped.to_string()
    } else {
        format!("https://{}", stripped)
    };

    with_scheme.trim_end_matches('/').to_string()
}

/// Check that a candidate URL parses with a scheme and a host.
///
/// Anything else (empty strings, bare fragments, `javascript:` leftovers that
/// survived normalization as garbage authorities) is rejected.
pub fn is_valid(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(parsed) => !parsed.scheme().is_empty() && parsed.has_host(),
        Err(_) => false,
    }
}

/// Extract the canonical domain of a URL: the host, lowercased, with a
/// leading `www.` removed. Returns `None` when the URL has no host.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    Some(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme() {
        assert_eq!(normalize("example.com"), "https://example.com");
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(normalize("http://example.com"), "http://example.com");
        assert_eq!(normalize("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_normalize_strips_leading_www() {
        assert_eq!(normalize("www.example.com"), "https://example.com");
    }

    #[test]
    fn test_normalize_keeps_www_after_scheme() {
        // Only a leading "www." is stripped; "https://www." stays untouched.
        assert_eq!(normalize("https://www.example.com"), "https://www.example.com");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  example.com  "), "https://example.com");
    }

    #[test]
    fn test_normalize_lowercases_whole_string() {
        assert_eq!(
            normalize("HTTPS://Example.COM/About/Team"),
            "https://example.com/about/team"
        );
    }

    #[test]
    fn test_normalize_strips_trailing_slashes() {
        assert_eq!(normalize("https://example.com/"), "https://example.com");
        assert_eq!(normalize("https://example.com//"), "https://example.com");
        assert_eq!(normalize("https://example.com/a/b/"), "https://example.com/a/b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "example.com",
            "www.Example.com/Path/",
            "  HTTP://WWW.EXAMPLE.COM//  ",
            "https://example.com/a?B=C",
            "sub.domain.example.com/page/",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_is_valid_accepts_normal_urls() {
        assert!(is_valid("https://example.com"));
        assert!(is_valid("http://127.0.0.1:8080/path"));
    }

    #[test]
    fn test_is_valid_rejects_garbage() {
        assert!(!is_valid(""));
        assert!(!is_valid("not a url"));
        assert!(!is_valid("https://"));
        assert!(!is_valid("https://javascript:void(0)"));
    }

    #[test]
    fn test_is_valid_after_normalize() {
        assert!(is_valid(&normalize("example.com")));
        assert!(!is_valid(&normalize("")));
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(
            domain_of("https://example.com/about"),
            Some("example.com".to_string())
        );
        assert_eq!(
            domain_of("https://www.example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(
            domain_of("https://Sub.Example.COM/x"),
            Some("sub.example.com".to_string())
        );
        assert_eq!(domain_of("not a url"), None);
    }
}
