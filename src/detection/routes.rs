//! Route whitelist and blacklist.
//!
//! # Responsibilities
//! - Compile route patterns once, at construction
//! - Answer whitelist / blacklist membership for a decoded path
//!
//! # Design Decisions
//! - Patterns are case-insensitive and anchored at the start only, so a
//!   prefix pattern also matches longer paths
//! - Empty whitelist = no restriction
//! - Duplicate patterns collapse

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::error::DetectorError;

/// Compiled route patterns.
#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    ignored: Vec<Regex>,
    matched: Vec<Regex>,
}

impl RouteFilter {
    /// Compile a blacklist (`ignored`) and a whitelist (`matched`).
    pub fn new<I, M, S, T>(ignored: I, matched: M) -> Result<Self, DetectorError>
    where
        I: IntoIterator<Item = S>,
        M: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Ok(Self {
            ignored: compile_routes(ignored)?,
            matched: compile_routes(matched)?,
        })
    }

    /// True when there is no whitelist or `path` matches one of its patterns.
    pub fn is_whitelisted(&self, path: &str) -> bool {
        self.matched.is_empty() || self.matched.iter().any(|re| re.is_match(path))
    }

    /// True when `path` matches a blacklist pattern.
    pub fn is_blacklisted(&self, path: &str) -> bool {
        self.ignored.iter().any(|re| re.is_match(path))
    }

    pub fn has_whitelist(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Compile one route pattern the way the filter matches it.
pub fn compile_route(pattern: &str) -> Result<Regex, DetectorError> {
    RegexBuilder::new(&format!("^(?:{pattern})"))
        .case_insensitive(true)
        .build()
        .map_err(|e| {
            DetectorError::InvalidConfiguration(format!("route pattern `{pattern}`: {e}"))
        })
}

fn compile_routes<I, S>(patterns: I) -> Result<Vec<Regex>, DetectorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    patterns
        .into_iter()
        .filter_map(|pattern| {
            let pattern: &str = pattern.as_ref();
            seen.insert(pattern.to_string())
                .then(|| compile_route(pattern))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn test_empty_whitelist_allows_everything() {
        let filter = RouteFilter::new(NONE, NONE).unwrap();
        assert!(filter.is_whitelisted("/anything"));
        assert!(!filter.is_blacklisted("/anything"));
        assert!(!filter.has_whitelist());
    }

    #[test]
    fn test_prefix_match_anchored_at_start() {
        let filter = RouteFilter::new(NONE, ["/blog"]).unwrap();
        assert!(filter.is_whitelisted("/blog/2014/post"));
        assert!(filter.is_whitelisted("/BLOG"));
        assert!(!filter.is_whitelisted("/en/blog"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let filter = RouteFilter::new(["/admin|/private"], NONE).unwrap();
        assert!(filter.is_blacklisted("/private/files"));
        assert!(filter.is_blacklisted("/admin"));
        assert!(!filter.is_blacklisted("/public/private"));
    }

    #[test]
    fn test_pattern_sees_query_string() {
        let filter = RouteFilter::new([r"/search\?q=secret"], NONE).unwrap();
        assert!(filter.is_blacklisted("/search?q=secret&page=2"));
        assert!(!filter.is_blacklisted("/search?q=public"));
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = RouteFilter::new(["/unclosed("], NONE).unwrap_err();
        assert!(matches!(err, DetectorError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_duplicates_collapse() {
        let filter = RouteFilter::new(["/a", "/a", "/b"], NONE).unwrap();
        assert_eq!(filter.ignored.len(), 2);
    }
}
