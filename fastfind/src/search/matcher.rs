use std::ffi::OsStr;
use std::ops::Range;
use std::sync::Arc;

/// Case-sensitive substring test against entry names
#[derive(Debug, Clone)]
pub struct NameMatcher {
    pattern: Arc<str>,
}

impl NameMatcher {
    /// Creates a new NameMatcher for the given pattern
    pub fn new(pattern: impl Into<Arc<str>>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Finds the first occurrence of the pattern in `name`.
    ///
    /// Names that are not valid UTF-8 are compared in their lossy form; the
    /// returned range indexes into that form.
    pub fn find(&self, name: &OsStr) -> Option<Range<usize>> {
        if self.pattern.is_empty() {
            return None;
        }
        let name = name.to_string_lossy();
        name.find(&*self.pattern)
            .map(|start| start..start + self.pattern.len())
    }

    pub fn is_match(&self, name: &OsStr) -> bool {
        self.find(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_match() {
        let matcher = NameMatcher::new("alpha");
        assert_eq!(matcher.find(OsStr::new("alpha.txt")), Some(0..5));
        assert_eq!(matcher.find(OsStr::new("alphabet.txt")), Some(0..5));
        assert_eq!(matcher.find(OsStr::new("my-alpha")), Some(3..8));
        assert_eq!(matcher.find(OsStr::new("beta.txt")), None);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let matcher = NameMatcher::new("Alpha");
        assert!(!matcher.is_match(OsStr::new("alpha.txt")));
        assert!(matcher.is_match(OsStr::new("Alpha.txt")));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let matcher = NameMatcher::new("ab");
        assert_eq!(matcher.find(OsStr::new("xabab")), Some(1..3));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let matcher = NameMatcher::new("");
        assert!(!matcher.is_match(OsStr::new("anything")));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name() {
        use std::os::unix::ffi::OsStrExt;

        let matcher = NameMatcher::new("log");
        let name = OsStr::from_bytes(b"\xffbad.log");
        // the invalid byte becomes a three-byte replacement character
        assert_eq!(matcher.find(name), Some(7..10));
    }
}
