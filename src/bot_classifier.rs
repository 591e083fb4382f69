//! Heuristic bot classification of user-agent strings.
//!
//! Patterns are data: plain substrings go into a single Aho-Corasick
//! automaton over their lowercase form, anything using regex syntax goes
//! into a case-insensitive `RegexSet`. A user-agent is a bot when either
//! engine reports a match.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use anyhow::{Context, Result};
use regex::{RegexSet, RegexSetBuilder};
use std::borrow::Cow;

use crate::pattern_config::PatternConfig;

/// Request-method tokens that betray a mis-extracted request line.
const HTTP_METHODS: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS"];

fn is_regex_pattern(pattern: &str) -> bool {
    pattern
        .chars()
        .any(|c| matches!(c, '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'))
}

/// A compiled, case-insensitive pattern set.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    literals: Option<AhoCorasick>,
    regexes: Option<RegexSet>,
    len: usize,
}

impl PatternMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let (regex_patterns, literal_patterns): (Vec<&str>, Vec<&str>) = patterns
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| !p.is_empty())
            .partition(|p| is_regex_pattern(p));

        let literals = if literal_patterns.is_empty() {
            None
        } else {
            // Unicode case folding happens on both sides via `to_lowercase`;
            // the automaton itself only folds ASCII.
            let lowered: Vec<String> = literal_patterns.iter().map(|p| p.to_lowercase()).collect();
            Some(
                AhoCorasickBuilder::new()
                    .ascii_case_insensitive(true)
                    .match_kind(MatchKind::LeftmostFirst)
                    .build(&lowered)
                    .context("Failed to build literal pattern automaton")?,
            )
        };

        let regexes = if regex_patterns.is_empty() {
            None
        } else {
            Some(
                RegexSetBuilder::new(&regex_patterns)
                    .case_insensitive(true)
                    .build()
                    .context("Failed to compile bot pattern regexes")?,
            )
        };

        tracing::debug!(
            "Compiled {} literal and {} regex patterns",
            literal_patterns.len(),
            regex_patterns.len()
        );

        Ok(Self {
            literals,
            regexes,
            len: literal_patterns.len() + regex_patterns.len(),
        })
    }

    #[inline]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.literals.as_ref().is_some_and(|ac| {
            let folded: Cow<str> = if haystack.is_ascii() {
                Cow::Borrowed(haystack)
            } else {
                Cow::Owned(haystack.to_lowercase())
            };
            ac.is_match(folded.as_ref())
        }) || self
            .regexes
            .as_ref()
            .is_some_and(|set| set.is_match(haystack))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Whether an extracted user-agent is worth classifying at all.
///
/// `-` is the log placeholder for an absent header, and a value that starts
/// with an HTTP method is a request line picked up by mistake.
pub fn is_usable_user_agent(user_agent: &str) -> bool {
    user_agent != "-" && !HTTP_METHODS.iter().any(|m| user_agent.starts_with(m))
}

#[derive(Debug, Clone)]
pub struct BotClassifier {
    matcher: PatternMatcher,
}

impl BotClassifier {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        Ok(Self {
            matcher: PatternMatcher::new(patterns)?,
        })
    }

    pub fn from_config(config: &PatternConfig) -> Result<Self> {
        let classifier = Self::new(config.bot_patterns.as_slice())?;
        if classifier.matcher.is_empty() {
            tracing::warn!("No bot patterns configured; no traffic will be classified as bot");
        }
        Ok(classifier)
    }

    /// Classify an extracted user-agent. Absent and unusable values are
    /// never bots.
    #[inline]
    pub fn classify(&self, user_agent: Option<&str>) -> bool {
        match user_agent {
            Some(ua) if is_usable_user_agent(ua) => self.is_bot(ua),
            _ => false,
        }
    }

    /// Raw pattern test, without the usability guard.
    #[inline]
    pub fn is_bot(&self, user_agent: &str) -> bool {
        self.matcher.is_match(user_agent)
    }

    pub fn pattern_count(&self) -> usize {
        self.matcher.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_classifier() -> BotClassifier {
        BotClassifier::from_config(&PatternConfig::default()).unwrap()
    }

    #[test]
    fn test_known_bots() {
        let classifier = default_classifier();
        let test_cases = vec![
            ("Mozilla/5.0 GoogleBot/2.1", true),
            ("Mozilla/5.0 (compatible; bingbot/2.0)", true),
            ("Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; GPTBot/1.0)", true),
            ("facebookexternalhit/1.1", true),
            ("curl/8.0", true),
            ("Python-urllib/3.11", true),
            ("Mozilla/5.0 (Windows NT 10.0; Win64; x64) Firefox/125.0", false),
        ];

        for (ua, expected) in test_cases {
            assert_eq!(classifier.classify(Some(ua)), expected, "Failed on: {}", ua);
        }
    }

    #[test]
    fn test_unusable_user_agents() {
        let classifier = default_classifier();
        assert!(!classifier.classify(None));
        assert!(!classifier.classify(Some("-")));
        assert!(!classifier.classify(Some("GET /robots.txt HTTP/1.1 bot")));
        assert!(!classifier.classify(Some("HEAD / crawler")));
    }

    #[test]
    fn test_synthetic_patterns() {
        let classifier = BotClassifier::new(&["acme-probe", r"^zz\d+$"]).unwrap();
        assert!(classifier.classify(Some("Mozilla ACME-Probe/1")));
        assert!(classifier.classify(Some("ZZ42")));
        assert!(!classifier.classify(Some("zz42x")));
        assert!(!classifier.classify(Some("Googlebot")));
        assert_eq!(classifier.pattern_count(), 2);
    }

    #[test]
    fn test_empty_pattern_set() {
        let classifier = BotClassifier::new::<&str>(&[]).unwrap();
        assert!(!classifier.classify(Some("Googlebot")));
        assert_eq!(classifier.pattern_count(), 0);
    }

    #[test]
    fn test_non_ascii_literal_folds_like_regex() {
        let literal = BotClassifier::new(&["ÉBOT"]).unwrap();
        let regex = BotClassifier::new(&["ÉBOT."]).unwrap();
        assert!(literal.classify(Some("ébot1")));
        assert!(regex.classify(Some("ébot1")));
        assert!(literal.classify(Some("Mozilla/5.0 (compatible; ÉBot/1.0)")));

        let lower = BotClassifier::new(&["straßenbot"]).unwrap();
        assert!(lower.classify(Some("STRAßENBOT/2")));
        assert!(!lower.classify(Some("strassenbot")));
    }

    #[test]
    fn test_empty_config_classifies_nothing() {
        let classifier = BotClassifier::from_config(&PatternConfig::empty()).unwrap();
        assert_eq!(classifier.pattern_count(), 0);
        assert!(!classifier.classify(Some("Googlebot")));
    }

    #[test]
    fn test_invalid_regex_is_error() {
        assert!(BotClassifier::new(&["(unclosed"]).is_err());
    }
}
