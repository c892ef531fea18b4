#[cfg(feature = "simd_acceleration")]
use memchr::memmem;
use regex::{Regex, RegexBuilder};

use crate::error::{ExtractError, Result};

/// How keywords are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Case-insensitive substring containment.
    #[default]
    Substring,
    /// Case-insensitive regex search anywhere in the line.
    Regex,
}

/// A single compiled keyword.
///
/// Matchers see both the raw line and its lowercase form so the lowering
/// happens once per line rather than once per keyword.
pub trait PatternMatcher: Send + Sync {
    fn is_match(&self, line: &str, line_lower: &str) -> bool;
}

/// Plain case-insensitive substring matcher
pub struct LiteralMatcher {
    needle: String,
}

impl LiteralMatcher {
    pub fn new(pattern: &str) -> Self {
        Self {
            needle: pattern.to_lowercase(),
        }
    }
}

impl PatternMatcher for LiteralMatcher {
    fn is_match(&self, _line: &str, line_lower: &str) -> bool {
        line_lower.contains(&self.needle)
    }
}

/// SIMD-accelerated case-insensitive substring matcher using memchr
#[cfg(feature = "simd_acceleration")]
pub struct SimdLiteralMatcher {
    finder: memmem::Finder<'static>,
}

#[cfg(feature = "simd_acceleration")]
impl SimdLiteralMatcher {
    pub fn new(pattern: &str) -> Self {
        let needle = pattern.to_lowercase();
        Self {
            finder: memmem::Finder::new(needle.as_bytes()).into_owned(),
        }
    }
}

#[cfg(feature = "simd_acceleration")]
impl PatternMatcher for SimdLiteralMatcher {
    fn is_match(&self, _line: &str, line_lower: &str) -> bool {
        self.finder.find(line_lower.as_bytes()).is_some()
    }
}

/// Case-insensitive regex matcher, searched against the raw line.
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ExtractError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self { regex })
    }
}

impl PatternMatcher for RegexMatcher {
    fn is_match(&self, line: &str, _line_lower: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// Factory for creating the most appropriate matcher for a keyword.
pub struct PatternMatcherFactory;

impl PatternMatcherFactory {
    /// Creates a matcher for `pattern` under `mode`.
    ///
    /// In regex mode a pattern without metacharacters is still matched as a
    /// literal, which is equivalent and skips the regex engine. Every other
    /// pattern is compiled, so a malformed one is reported here.
    pub fn create(pattern: &str, mode: MatchMode) -> Result<Box<dyn PatternMatcher>> {
        match mode {
            MatchMode::Regex if Self::is_complex_pattern(pattern) => {
                Ok(Box::new(RegexMatcher::new(pattern)?))
            }
            _ => Ok(Self::literal(pattern)),
        }
    }

    /// Compile every keyword in order, failing on the first bad one.
    pub fn create_all(patterns: &[String], mode: MatchMode) -> Result<Vec<Box<dyn PatternMatcher>>> {
        patterns.iter().map(|p| Self::create(p, mode)).collect()
    }

    #[cfg(feature = "simd_acceleration")]
    fn literal(pattern: &str) -> Box<dyn PatternMatcher> {
        Box::new(SimdLiteralMatcher::new(pattern))
    }

    #[cfg(not(feature = "simd_acceleration"))]
    fn literal(pattern: &str) -> Box<dyn PatternMatcher> {
        Box::new(LiteralMatcher::new(pattern))
    }

    /// True if the pattern needs the regex engine
    fn is_complex_pattern(pattern: &str) -> bool {
        regex::escape(pattern) != pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(matcher: &dyn PatternMatcher, line: &str) -> bool {
        matcher.is_match(line, &line.to_lowercase())
    }

    #[test]
    fn test_literal_matcher_ignores_case() {
        let matcher = LiteralMatcher::new("Error");
        assert!(check(&matcher, "Oct 29 12:04:12 ERROR disk full"));
        assert!(check(&matcher, "an error occurred"));
        assert!(!check(&matcher, "all good"));
    }

    #[cfg(feature = "simd_acceleration")]
    #[test]
    fn test_simd_literal_matcher_ignores_case() {
        let matcher = SimdLiteralMatcher::new("DISK FULL");
        assert!(check(&matcher, "Oct 29 12:04:12 ERROR disk full"));
        assert!(!check(&matcher, "Oct 29 12:04:12 ERROR disk ok"));
    }

    #[test]
    fn test_regex_matcher_searches_anywhere() {
        let matcher = RegexMatcher::new("err.*disk").unwrap();
        assert!(check(&matcher, "Oct 29 12:04:12 ERROR disk full"));
        assert!(!check(&matcher, "disk before error"));
    }

    #[test]
    fn test_invalid_regex_names_pattern() {
        let err = PatternMatcherFactory::create("(unclosed", MatchMode::Regex)
            .err()
            .unwrap();
        match err {
            ExtractError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_substring_mode_never_compiles() {
        let matcher = PatternMatcherFactory::create("(unclosed", MatchMode::Substring).unwrap();
        assert!(check(matcher.as_ref(), "got (UNCLOSED paren"));
    }

    #[test]
    fn test_modes_agree_on_literal_patterns() {
        let lines = [
            "Oct 29 12:04:12 ERROR disk full",
            "Oct 29 12:04:13 ns login ok",
            "Oct 29 12:04:14 SSLVPN Session started",
        ];
        for keyword in ["error", "Login", "sslvpn session", "missing"] {
            let sub = PatternMatcherFactory::create(keyword, MatchMode::Substring).unwrap();
            let re = RegexMatcher::new(keyword).unwrap();
            for line in lines {
                assert_eq!(check(sub.as_ref(), line), check(&re, line), "{keyword} on {line}");
            }
        }
    }

    #[test]
    fn test_complex_pattern_detection() {
        assert!(!PatternMatcherFactory::is_complex_pattern("ERROR"));
        assert!(!PatternMatcherFactory::is_complex_pattern("disk full"));
        assert!(PatternMatcherFactory::is_complex_pattern("err.*disk"));
        assert!(PatternMatcherFactory::is_complex_pattern("a{2}"));
    }
}
