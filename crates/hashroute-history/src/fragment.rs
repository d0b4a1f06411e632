//! Fragment parsing
//!
//! Grammar accepted by [`parse_fragment`]:
//! ```text
//! ["#"]["/"]*path["?"query]
//! ```
//! Trailing whitespace on the path is ignored, and the query is trimmed.

use crate::state::CanonicalState;

/// Characters stripped from the start of a fragment
const FRAGMENT_PREFIX: [char; 2] = ['#', '/'];

const QUERY_SEPARATOR: char = '?';

/// Parse a raw fragment into its canonical state.
///
/// An embedded `?query` always wins over `fallback_query`. Total over all
/// inputs: `""` parses to the root state `/`.
pub fn parse_fragment(fragment: &str, fallback_query: Option<&str>) -> CanonicalState {
    let (path, query) = match fragment.split_once(QUERY_SEPARATOR) {
        Some((path, query)) => (path, query.trim()),
        None => (fragment, fallback_query.unwrap_or_default()),
    };

    let path = path.trim_start_matches(FRAGMENT_PREFIX).trim_end();

    CanonicalState::new(format!("/{}", path), query.to_string())
}

/// Wrap `root` in exactly one leading and one trailing slash.
pub fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// True for targets that must leave the application: an optional alphabetic
/// scheme and `:`, followed by `//`. Protocol-relative `//host` counts too.
pub fn is_absolute_url(target: &str) -> bool {
    let rest = match target.split_once(':') {
        Some((scheme, rest))
            if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            rest
        }
        _ => target,
    };

    rest.starts_with("//")
}

/// Collapse every run of `/` into a single slash.
pub(crate) fn collapse_slashes(url: &str) -> String {
    let mut collapsed = String::with_capacity(url.len());
    let mut previous_slash = false;
    for ch in url.chars() {
        if ch == '/' && previous_slash {
            continue;
        }
        previous_slash = ch == '/';
        collapsed.push(ch);
    }
    collapsed
}
