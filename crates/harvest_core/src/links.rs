use url::Url;

/// Path markers that identify a post page. Only these two shapes are
/// harvested: `/{user}/p/{code}` and `/{user}/reel/{code}`.
const POST_PATH_MARKERS: [&str; 2] = ["p", "reel"];

/// Normalizes a raw anchor href into a post identity key.
///
/// Returns `None` when the href does not point at a post on the profile's
/// host. The identity is the absolute URL with query string and fragment
/// stripped, so links that differ only by tracking parameters collapse to
/// one key.
pub fn normalize_post_link(href: &str, base: &Url) -> Option<String> {
    let mut joined = base.join(href).ok()?;
    if joined.host_str() != base.host_str() {
        return None;
    }
    joined.set_query(None);
    joined.set_fragment(None);

    let mut segments = joined.path_segments()?.filter(|s| !s.is_empty());
    let _user = segments.next()?;
    let marker = segments.next()?;
    let code = segments.next()?;
    if code.is_empty() || !POST_PATH_MARKERS.contains(&marker) {
        return None;
    }

    Some(joined.to_string())
}
