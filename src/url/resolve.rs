use url::Url;

/// Schemes that never lead to a fetchable document
const NON_NAVIGABLE_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Returns true if an href is an action or an in-page anchor rather than a page
///
/// Matching is case-insensitive on the scheme prefix.
pub fn is_non_navigable(href: &str) -> bool {
    let href = href.trim();
    if href.starts_with('#') {
        return true;
    }

    let lowered = href.to_ascii_lowercase();
    NON_NAVIGABLE_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}

/// Resolves an href or src attribute against the page it was found on
///
/// Returns None if the value should be excluded:
/// - empty values
/// - javascript:, mailto:, tel:, data: values and fragment-only anchors
/// - values that fail to resolve
/// - non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is removed.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || is_non_navigable(href) {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute)
}
