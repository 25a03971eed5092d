//! URL canonicalization.
//!
//! The canonical form is only a comparison key. The URL a user typed is
//! always kept verbatim on the bookmark itself.
use url::Url;

/// Maps a raw URL to the key used to decide whether two bookmarks are the same.
///
/// Scheme and host are lower-cased, the fragment is dropped and a single
/// trailing slash is removed from the path. Path case, query and port are
/// left alone. Input that does not parse as a URL is returned unchanged so
/// lookups stay consistent for it.
pub fn canonicalize(raw: &str) -> String {
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };

    // The parser already folds case for http(s) and friends, but keeps
    // opaque hosts of other schemes as written.
    if let Some(host) = url.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host && url.set_host(Some(&lowered)).is_err() {
            return raw.to_string();
        }
    }

    url.set_fragment(None);

    let path = url.path();
    // "/" is the shortest path a hierarchical URL can serialize.
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path[..path.len() - 1].to_string();
        url.set_path(&trimmed);
    }

    url.to_string()
}

/// True when both URLs canonicalize to the same key.
pub fn same_bookmark_url(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}
