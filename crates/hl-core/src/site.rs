//! Site blocking checks
//!
//! Two granularities exist and are deliberately kept apart:
//!
//! - [`is_site_blocked`] walks the URL segment by segment. Each segment is
//!   checked alone and as the cumulative path from the domain, so a blocked
//!   `example.com` covers every page under it while a blocked
//!   `example.com/page` covers only that page and its children.
//! - [`is_navigation_blocked`] is the coarse gate used before a page load. It
//!   checks the domain alone and `domain + path + query` as a single unit.
//!
//! Both fail open: a URL that cannot be decomposed is logged and reported as
//! not blocked.

use crate::hash::{DigestSet, Digester, HashError};
use crate::url::{SiteUrl, UrlError};

/// Cumulative per-segment check of `url` against `set`.
pub fn is_site_blocked<D: Digester + ?Sized>(digester: &D, url: &str, set: &DigestSet) -> bool {
    if set.is_empty() {
        return false;
    }

    let parsed = match SiteUrl::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Site check skipped: {}", e);
            return false;
        }
    };

    match site_segments_blocked(digester, &parsed, set) {
        Ok(blocked) => blocked,
        Err(e) => {
            log::warn!("Site check failed open for {:?}: {}", url, e);
            false
        }
    }
}

fn site_segments_blocked<D: Digester + ?Sized>(
    digester: &D,
    url: &SiteUrl<'_>,
    set: &DigestSet,
) -> Result<bool, HashError> {
    let mut cumulative = String::new();

    for (i, segment) in url.segments().enumerate() {
        if i > 0 {
            cumulative.push('/');
        }
        cumulative.push_str(segment);

        if set.contains(&digester.digest(segment)?) {
            return Ok(true);
        }
        if i > 0 && set.contains(&digester.digest(&cumulative)?) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Domain and whole-target check of `url` against `set`.
pub fn is_navigation_blocked<D: Digester + ?Sized>(digester: &D, url: &str, set: &DigestSet) -> bool {
    if set.is_empty() {
        return false;
    }

    let parsed = match SiteUrl::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Navigation check skipped: {}", e);
            return false;
        }
    };

    match navigation_target_blocked(digester, &parsed, set) {
        Ok(blocked) => blocked,
        Err(e) => {
            log::warn!("Navigation check failed open for {:?}: {}", url, e);
            false
        }
    }
}

fn navigation_target_blocked<D: Digester + ?Sized>(
    digester: &D,
    url: &SiteUrl<'_>,
    set: &DigestSet,
) -> Result<bool, HashError> {
    if set.contains(&digester.digest(url.domain)?) {
        return Ok(true);
    }

    let mut target = String::with_capacity(url.domain.len() + url.path.len() + url.query.len() + 1);
    target.push_str(url.domain);
    target.push_str(url.trimmed_path());
    if !url.query.is_empty() {
        target.push('?');
        target.push_str(url.query);
    }

    if target.len() == url.domain.len() {
        return Ok(false);
    }

    Ok(set.contains(&digester.digest(&target)?))
}

/// Canonical form under which a site entry is digested when it is added.
///
/// Scheme, `www.`, port, query, fragment, and empty or trailing path segments
/// are dropped and the result is lowercased.
pub fn canonical_site(input: &str) -> Result<String, UrlError> {
    let parsed = SiteUrl::parse(input)?;
    let segments: Vec<&str> = parsed.segments().collect();
    Ok(segments.join("/").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{digest_str, Digest, Sha256Digester};

    fn sites(entries: &[&str]) -> DigestSet {
        DigestSet::from_plaintext(entries.iter().copied())
    }

    #[test]
    fn test_domain_blocks_everything_under_it() {
        let set = sites(&["example.com"]);
        assert!(is_site_blocked(&Sha256Digester, "https://www.example.com/anything", &set));
        assert!(is_site_blocked(&Sha256Digester, "http://EXAMPLE.com", &set));
        assert!(!is_site_blocked(&Sha256Digester, "https://notexample.com", &set));
    }

    #[test]
    fn test_path_blocks_only_that_path() {
        let set = sites(&["example.com/page"]);
        assert!(is_site_blocked(&Sha256Digester, "https://example.com/page", &set));
        assert!(is_site_blocked(&Sha256Digester, "https://example.com/page/sub?x=1", &set));
        assert!(!is_site_blocked(&Sha256Digester, "https://example.com/other", &set));
        assert!(!is_site_blocked(&Sha256Digester, "https://example.com/", &set));
    }

    #[test]
    fn test_segment_alone_matches() {
        let set = sites(&["forum"]);
        assert!(is_site_blocked(&Sha256Digester, "https://example.com/forum/thread", &set));
    }

    #[test]
    fn test_malformed_url_not_blocked() {
        let set = sites(&["example.com"]);
        assert!(!is_site_blocked(&Sha256Digester, "", &set));
        assert!(!is_site_blocked(&Sha256Digester, "https:///", &set));
        assert!(!is_navigation_blocked(&Sha256Digester, "about:blank", &set));
    }

    #[test]
    fn test_navigation_domain() {
        let set = sites(&["example.com"]);
        assert!(is_navigation_blocked(&Sha256Digester, "https://example.com/anything", &set));
        assert!(!is_navigation_blocked(&Sha256Digester, "https://notexample.com", &set));
    }

    #[test]
    fn test_navigation_whole_target() {
        let set = sites(&["example.com/page?id=3"]);
        assert!(is_navigation_blocked(&Sha256Digester, "https://www.example.com/page?id=3", &set));
        assert!(!is_navigation_blocked(&Sha256Digester, "https://example.com/page?id=4", &set));
        // No segment walk in the coarse gate.
        let set = sites(&["example.com/page"]);
        assert!(!is_navigation_blocked(&Sha256Digester, "https://example.com/page/sub", &set));
        assert!(is_site_blocked(&Sha256Digester, "https://example.com/page/sub", &set));
    }

    #[test]
    fn test_canonical_site_round_trip() {
        assert_eq!(canonical_site("WWW.EXAMPLE.COM/").unwrap(), "example.com");
        assert_eq!(digest_str(&canonical_site("WWW.EXAMPLE.COM/").unwrap()), digest_str("example.com"));
        assert_eq!(canonical_site("https://www.Example.com/Page/?q=1").unwrap(), "example.com/page");
        assert!(canonical_site("").is_err());
    }

    #[test]
    fn test_hash_failure_fails_open() {
        struct BrokenDigester;
        impl Digester for BrokenDigester {
            fn digest_normalized(&self, _: &str) -> Result<Digest, HashError> {
                Err(HashError::Unavailable("insecure context".into()))
            }
        }
        let set = sites(&["example.com"]);
        assert!(!is_site_blocked(&BrokenDigester, "https://example.com", &set));
        assert!(!is_navigation_blocked(&BrokenDigester, "https://example.com", &set));
    }
}
