//! User agent matching against robot token lists.

use dashmap::DashMap;
use regex::{Regex, RegexBuilder};

use crate::error::DetectorError;

/// Number of distinct token lists kept before the memo is flushed.
const MEMO_CAPACITY: usize = 32;

/// Compiled robot alternations, keyed by pattern text.
///
/// Rule sets may change between calls, so entries are keyed by content
/// rather than by list identity.
#[derive(Debug, Default)]
pub struct RobotMatcher {
    memo: DashMap<String, Regex>,
}

impl RobotMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `user_agent` starts with any of `tokens`, ignoring case.
    /// An empty token list matches nothing.
    pub fn matches(&self, tokens: &[&str], user_agent: &str) -> Result<bool, DetectorError> {
        if tokens.is_empty() {
            return Ok(false);
        }
        let regex = self.compile(tokens)?;
        Ok(regex.is_match(user_agent))
    }

    fn compile(&self, tokens: &[&str]) -> Result<Regex, DetectorError> {
        let alternation = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        if let Some(regex) = self.memo.get(&alternation) {
            return Ok(regex.clone());
        }

        let regex = RegexBuilder::new(&format!("^(?:{alternation})"))
            .case_insensitive(true)
            .build()
            .map_err(|e| DetectorError::MalformedRuleData(format!("robot tokens: {e}")))?;

        if self.memo.len() >= MEMO_CAPACITY {
            self.memo.clear();
        }
        self.memo.insert(alternation, regex.clone());
        Ok(regex)
    }

    #[cfg(test)]
    fn cached(&self) -> usize {
        self.memo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_case_insensitive() {
        let matcher = RobotMatcher::new();
        let tokens = ["Googlebot", "bingbot"];
        assert!(matcher.matches(&tokens, "Googlebot/2.1 (+http://www.google.com/bot.html)").unwrap());
        assert!(matcher.matches(&tokens, "BINGBOT/2.0").unwrap());
        assert!(!matcher.matches(&tokens, "Mozilla/5.0 (compatible; Googlebot/2.1)").unwrap());
    }

    #[test]
    fn test_tokens_are_literal() {
        let matcher = RobotMatcher::new();
        assert!(matcher.matches(&["Yahoo! Slurp"], "Yahoo! Slurp China").unwrap());
        assert!(!matcher.matches(&["a.c"], "abc").unwrap());
        assert!(matcher.matches(&["a.c"], "a.c").unwrap());
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let matcher = RobotMatcher::new();
        assert!(!matcher.matches(&[], "").unwrap());
        assert!(!matcher.matches(&[], "Googlebot").unwrap());
    }

    #[test]
    fn test_memo_reused_and_bounded() {
        let matcher = RobotMatcher::new();
        matcher.matches(&["x"], "x").unwrap();
        matcher.matches(&["x"], "y").unwrap();
        assert_eq!(matcher.cached(), 1);

        for i in 0..(MEMO_CAPACITY * 2) {
            let token = format!("bot{i}");
            matcher.matches(&[token.as_str()], "bot").unwrap();
        }
        assert!(matcher.cached() <= MEMO_CAPACITY);
    }
}
