use crate::UrlError;
use url::form_urlencoded;
use url::Url;

/// Query parameters that never change which document a link points at
const IGNORED_QUERY_KEYS: &[&str] = &["fbclid", "gclid", "mc_eid", "return_to"];

/// Canonicalizes a link into the form used as a document identity
///
/// Two links that reach the same document collapse to the same value:
///
/// - only `http` and `https` are accepted, and the host must be present
/// - the host is lowercased; scheme, `www.` prefix and path case are kept
/// - empty and `.` path segments are dropped, `..` pops a segment, and the
///   trailing slash goes (the bare root stays `/`)
/// - the fragment is dropped
/// - `utm_*` and other campaign keys are removed from the query, the rest is
///   sorted by key, and an empty query disappears entirely
///
/// # Examples
///
/// ```
/// use tidemark::url::normalize_url;
///
/// let url = normalize_url("https://Support.Example.COM/hc/articles/1-Intro/#top").unwrap();
/// assert_eq!(url.as_str(), "https://support.example.com/hc/articles/1-Intro");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?.to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("{}: {}", host, e)))?;

    let path = canonical_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    let query = canonical_query(&url);
    url.set_query(query.as_deref());

    Ok(url)
}

fn canonical_path(path: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop();
            }
            other => kept.push(other),
        }
    }
    format!("/{}", kept.join("/"))
}

/// Rebuilt query string, or `None` when nothing meaningful is left
fn canonical_query(url: &Url) -> Option<String> {
    url.query()?;

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_ignored_key(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        return None;
    }
    pairs.sort();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(pairs);
    Some(serializer.finish())
}

fn is_ignored_key(key: &str) -> bool {
    key.starts_with("utm_") || IGNORED_QUERY_KEYS.contains(&key)
}
