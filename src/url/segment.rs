/// Returns the trailing path segment of a URL
///
/// This is the string the visibility check looks for inside anchor `href`
/// attributes on the parent page. Query strings and fragments are dropped and
/// a trailing slash is ignored, so `https://a.test/docs/intro/` and
/// `https://a.test/docs/intro?x=1` both yield `intro`. A URL without a path
/// yields its host.
///
/// # Examples
///
/// ```
/// use link_sweeper::url::trailing_segment;
///
/// assert_eq!(trailing_segment("http://example.test/b"), Some("b".to_string()));
/// assert_eq!(trailing_segment("http://example.test/docs/intro/"), Some("intro".to_string()));
/// assert_eq!(trailing_segment("http://example.test/"), Some("example.test".to_string()));
/// ```
pub fn trailing_segment(raw: &str) -> Option<String> {
    let without_fragment = raw.split('#').next().unwrap_or(raw);
    let without_query = without_fragment
        .split('?')
        .next()
        .unwrap_or(without_fragment);

    let after_scheme = match without_query.find("://") {
        Some(idx) => &without_query[idx + 3..],
        None => without_query,
    };

    after_scheme
        .split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
