//! Ignore rules
//!
//! A rule carries up to three criteria. A record is suppressed when every
//! criterion a rule sets is found, trimmed and case-insensitively, as a
//! substring of the matching record field:
//!
//! | criterion | record field |
//! |-----------|--------------|
//! | `name`    | facility     |
//! | `type`    | mnemonic     |
//! | `msg`     | message      |
//!
//! Rules are OR-ed: any fully satisfied rule suppresses the record. A rule
//! with no criteria is void and never matches.

use crate::search::LogSource;
use serde::{Deserialize, Serialize};

/// One ignore rule from `ignore.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    /// Matched against the record facility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Matched against the record mnemonic
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    /// Matched against the record message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl IgnoreRule {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn rule_type(mut self, rule_type: impl Into<String>) -> Self {
        self.rule_type = Some(rule_type.into());
        self
    }

    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    fn criteria(&self) -> [(Option<&str>, FieldFn); 3] {
        [
            (non_empty(&self.name), facility),
            (non_empty(&self.rule_type), mnemonic),
            (non_empty(&self.msg), message),
        ]
    }

    /// Number of criteria this rule sets
    pub fn criteria_count(&self) -> usize {
        self.criteria().iter().filter(|(c, _)| c.is_some()).count()
    }

    /// Number of set criteria satisfied by the record
    pub fn match_count(&self, source: &LogSource) -> usize {
        self.criteria()
            .iter()
            .filter_map(|(criterion, field)| criterion.map(|c| (c, field(source))))
            .filter(|(criterion, field)| contains_folded(field, criterion))
            .count()
    }

    /// True when every criterion the rule sets is satisfied
    pub fn matches(&self, source: &LogSource) -> bool {
        let wanted = self.criteria_count();
        wanted > 0 && self.match_count(source) == wanted
    }
}

type FieldFn = fn(&LogSource) -> &str;

fn facility(source: &LogSource) -> &str {
    &source.facility
}

fn mnemonic(source: &LogSource) -> &str {
    &source.mnemonic
}

fn message(source: &LogSource) -> &str {
    &source.message
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}

/// Decides suppression for retrieved records
#[derive(Debug, Clone, Copy)]
pub struct IgnoreEngine<'a> {
    rules: &'a [IgnoreRule],
    enabled: bool,
}

impl<'a> IgnoreEngine<'a> {
    pub fn new(rules: &'a [IgnoreRule], enabled: bool) -> Self {
        Self { rules, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the record is noise. Always false when the engine is disabled.
    pub fn suppress(&self, source: &LogSource) -> bool {
        self.enabled && self.rules.iter().any(|rule| rule.matches(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(facility: &str, mnemonic: &str, message: &str) -> LogSource {
        LogSource {
            facility: facility.to_string(),
            mnemonic: mnemonic.to_string(),
            message: message.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_type_rule_is_case_insensitive_substring() {
        let rules = vec![IgnoreRule::default().rule_type("BGP")];
        let engine = IgnoreEngine::new(&rules, true);

        assert!(engine.suppress(&record("ROUTING", "bgp-down", "")));
        assert!(!engine.suppress(&record("ROUTING", "ospf-up", "")));
    }

    #[test]
    fn test_criteria_are_trimmed() {
        let rules = vec![IgnoreRule::default().msg("  Loopback0 ")];
        let engine = IgnoreEngine::new(&rules, true);
        assert!(engine.suppress(&record("", "", "Interface loopback0 changed state")));
    }

    #[test]
    fn test_two_criteria_require_both() {
        let rules = vec![IgnoreRule::default().name("LINK").msg("Loopback")];
        let engine = IgnoreEngine::new(&rules, true);

        assert!(engine.suppress(&record("LINK", "UPDOWN", "Interface Loopback1 up")));
        assert!(!engine.suppress(&record("LINK", "UPDOWN", "Interface Gi0/1 up")));
        assert!(!engine.suppress(&record("SYS", "UPDOWN", "Interface Loopback1 up")));
    }

    #[test]
    fn test_counts() {
        let rule = IgnoreRule::default().name("link").rule_type("updown");
        let rec = record("LINK", "CHANGED", "");
        assert_eq!(rule.criteria_count(), 2);
        assert_eq!(rule.match_count(&rec), 1);
        assert!(!rule.matches(&rec));
    }

    #[test]
    fn test_empty_rule_is_void() {
        let rules = vec![IgnoreRule::default(), IgnoreRule::default().msg("")];
        let engine = IgnoreEngine::new(&rules, true);
        assert_eq!(rules[1].criteria_count(), 0);
        assert!(!engine.suppress(&record("LINK", "UPDOWN", "anything")));
    }

    #[test]
    fn test_any_rule_suppresses_regardless_of_order() {
        let rec = record("LINK", "UPDOWN", "Interface Gi0/1 down");
        let matching = IgnoreRule::default().rule_type("updown");
        let other = IgnoreRule::default().rule_type("bgp");

        let first = vec![matching.clone(), other.clone()];
        let last = vec![other, matching];
        assert!(IgnoreEngine::new(&first, true).suppress(&rec));
        assert!(IgnoreEngine::new(&last, true).suppress(&rec));
    }

    #[test]
    fn test_disabled_never_suppresses() {
        let rules = vec![IgnoreRule::default().rule_type("UPDOWN")];
        let engine = IgnoreEngine::new(&rules, false);
        assert!(!engine.is_enabled());
        assert!(!engine.suppress(&record("LINK", "UPDOWN", "")));
    }
}
