/// A set of substrings matched against URLs
///
/// Matching is a plain substring test. When `case_sensitive` is false both
/// the patterns and the candidate are lowercased before comparison.
///
/// # Examples
///
/// ```
/// use link_sweeper::url::SubstringMatcher;
///
/// let matcher = SubstringMatcher::new(vec!["/ads/".to_string()], true);
/// assert!(matcher.matches("http://example.test/ads/x"));
/// assert!(!matcher.matches("http://example.test/ADS/x"));
///
/// let relaxed = SubstringMatcher::new(vec!["/ads/".to_string()], false);
/// assert!(relaxed.matches("http://example.test/ADS/x"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SubstringMatcher {
    patterns: Vec<String>,
    case_sensitive: bool,
}

impl SubstringMatcher {
    pub fn new(patterns: Vec<String>, case_sensitive: bool) -> Self {
        let patterns = patterns
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| if case_sensitive { p } else { p.to_lowercase() })
            .collect();

        Self {
            patterns,
            case_sensitive,
        }
    }

    /// Returns true if `candidate` contains any of the patterns
    pub fn matches(&self, candidate: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        if self.case_sensitive {
            self.patterns.iter().any(|p| candidate.contains(p.as_str()))
        } else {
            let lowered = candidate.to_lowercase();
            self.patterns.iter().any(|p| lowered.contains(p.as_str()))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}
