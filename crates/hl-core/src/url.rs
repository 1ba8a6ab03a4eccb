//! URL decomposition for site matching
//!
//! A small hand-rolled splitter rather than a full URL parser: navigation
//! targets only need the host, path, and query as slices of the input. Inputs
//! without a scheme are accepted so block-list entries like
//! `www.example.com/page` decompose the same way as full URLs.

/// The input could not be decomposed into a host and path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,
    #[error("URL has no host: {0:?}")]
    MissingHost(String),
    #[error("invalid host {host:?} in {url:?}")]
    InvalidHost { url: String, host: String },
}

// =============================================================================
// Scheme
// =============================================================================

/// Get the position after "://", if the URL has a scheme.
#[inline]
pub fn get_scheme_end(url: &str) -> Option<usize> {
    let bytes = url.as_bytes();
    let colon_pos = bytes.iter().position(|&b| b == b':')?;

    // Scheme chars only; anything else means the colon belongs to a port or path.
    if colon_pos == 0
        || !bytes[..colon_pos]
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
    {
        return None;
    }

    if bytes.len() > colon_pos + 2 && bytes[colon_pos + 1] == b'/' && bytes[colon_pos + 2] == b'/' {
        return Some(colon_pos + 3);
    }

    None
}

/// Strip a leading `www.` (any case).
#[inline]
pub fn strip_www(host: &str) -> &str {
    if host.len() >= 4 && host.as_bytes()[..4].eq_ignore_ascii_case(b"www.") {
        &host[4..]
    } else {
        host
    }
}

// =============================================================================
// Site URL
// =============================================================================

/// Borrowed decomposition of a URL for site matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteUrl<'a> {
    /// Host without userinfo, port, or leading `www.`
    pub domain: &'a str,
    /// Path including its leading `/`, or empty
    pub path: &'a str,
    /// Query without its leading `?`, or empty
    pub query: &'a str,
}

impl<'a> SiteUrl<'a> {
    /// Decompose `url`. Scheme is optional; fragments are dropped.
    pub fn parse(url: &'a str) -> Result<Self, UrlError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }

        let rest = match get_scheme_end(trimmed) {
            Some(end) => &trimmed[end..],
            None => trimmed,
        };

        let rest = match rest.find('#') {
            Some(pos) => &rest[..pos],
            None => rest,
        };

        let (before_query, query) = match rest.find('?') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };

        let (authority, path) = match before_query.find('/') {
            Some(pos) => (&before_query[..pos], &before_query[pos..]),
            None => (before_query, ""),
        };

        // Skip userinfo
        let host_port = match authority.rfind('@') {
            Some(pos) => &authority[pos + 1..],
            None => authority,
        };

        let host = split_port(host_port).ok_or_else(|| UrlError::InvalidHost {
            url: url.to_string(),
            host: host_port.to_string(),
        })?;

        if host.is_empty() {
            return Err(UrlError::MissingHost(url.to_string()));
        }
        if !is_valid_host(host) {
            return Err(UrlError::InvalidHost {
                url: url.to_string(),
                host: host.to_string(),
            });
        }

        Ok(Self {
            domain: strip_www(host),
            path,
            query,
        })
    }

    /// Non-empty `/`-delimited segments, starting with the domain.
    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        let domain = self.domain;
        std::iter::once(domain).chain(self.path.split('/').filter(|s| !s.is_empty()))
    }

    /// Path with any trailing `/` removed.
    #[inline]
    pub fn trimmed_path(&self) -> &'a str {
        self.path.trim_end_matches('/')
    }
}

/// Separate an optional `:port`; `None` when the port is not numeric.
fn split_port(host_port: &str) -> Option<&str> {
    // Bracketed IPv6 literal
    if let Some(inner) = host_port.strip_prefix('[') {
        let close = inner.find(']')?;
        let after = &inner[close + 1..];
        if !after.is_empty() && !is_port(after.strip_prefix(':')?) {
            return None;
        }
        return Some(&host_port[..close + 2]);
    }

    match host_port.find(':') {
        Some(pos) if is_port(&host_port[pos + 1..]) => Some(&host_port[..pos]),
        Some(_) => None,
        None => Some(host_port),
    }
}

#[inline]
fn is_port(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Registered names allow alphanumerics, `.`, `-` and `_`; brackets and
/// colons only as an IPv6 literal.
#[inline]
fn is_valid_host(host: &str) -> bool {
    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return !inner.is_empty() && inner.chars().all(|c| c.is_ascii_hexdigit() || matches!(c, ':' | '.'));
    }
    host.chars().all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
}
