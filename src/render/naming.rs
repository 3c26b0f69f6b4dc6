//! Output file naming

use crate::fingerprint::fingerprint;
use crate::url::DocumentId;

/// Turns a title into a file-name-safe slug
///
/// Lowercases, drops everything except ASCII letters, digits, whitespace and
/// hyphens, then collapses each run of whitespace or hyphens into a single
/// hyphen and trims hyphens from both ends. May return an empty string.
///
/// # Examples
///
/// ```
/// use tidemark::render::slugify;
///
/// assert_eq!(slugify("Getting Started: Setup (v2)"), "getting-started-setup-v2");
/// assert_eq!(slugify("  --Hello__World--  "), "helloworld");
/// assert_eq!(slugify("日本語"), "");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    slug
}

/// Name used when the title yields an empty slug
///
/// `article-{index}-{n}` where `n` is derived from the identity's
/// fingerprint, so the same document always gets the same fallback name.
pub fn fallback_name(index: usize, id: &DocumentId) -> String {
    let digest = fingerprint(id.as_str());
    let n = u64::from_str_radix(digest.short(8), 16).unwrap_or(0) % 10_000;
    format!("article-{}-{}", index, n)
}

/// Title with the site suffix removed, or the last path segment of the
/// identity when the page has no title
pub fn document_title(page_title: Option<&str>, suffix: &str, id: &DocumentId) -> String {
    match page_title {
        Some(title) if !suffix.is_empty() => title.replace(suffix, "").trim().to_string(),
        Some(title) => title.trim().to_string(),
        None => id
            .as_str()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Output file name (`<slug>.md`) for a document
pub fn output_file_name(title: &str, index: usize, id: &DocumentId) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("{}.md", fallback_name(index, id))
    } else {
        format!("{}.md", slug)
    }
}

/// `<stem>-<hash>.md` for a document whose preferred name is taken
pub fn disambiguated_name(name: &str, id: &DocumentId) -> String {
    let stem = name.strip_suffix(".md").unwrap_or(name);
    format!("{}-{}.md", stem, fingerprint(id.as_str()).short(8))
}
