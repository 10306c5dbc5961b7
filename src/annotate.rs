//! Line rendering and topic tags
//!
//! Each surviving record becomes one display line: a highlighted header with
//! the device timestamp, facility and mnemonic, followed by the message body.
//! The line then gets a quick-glance emoji tag for every topic keyword it
//! contains.

use crate::search::LogSource;
use regex::Regex;

const HEADER_ON: &str = "\x1b[91m";
const HEADER_OFF: &str = "\x1b[0m";

/// Marker of messages that carry a `CID=0x..;` prefix before the text
const CID_MARKER: &str = "CID=0x";

/// Render a record as a display line
pub fn render_record(source: &LogSource) -> String {
    let origin = source.hosttimestamp.split('.').next().unwrap_or_default();
    if origin.is_empty() {
        return format!("{}\n", source.message);
    }

    let body = if source.message.contains(CID_MARKER) {
        source
            .message
            .split_once(';')
            .map(|(_, rest)| rest)
            .unwrap_or(&source.message)
    } else {
        &source.message
    };

    format!(
        "{HEADER_ON}{:<20} {:<10} {:<20}{HEADER_OFF}\n{}\n",
        origin.replacen('T', " ", 1),
        source.facility,
        source.mnemonic,
        body
    )
}

/// Adds topic tags to a rendered line
pub trait Annotate {
    fn annotate(&self, line: &str) -> String;
}

/// Keyword based emoji tagger
#[derive(Debug, Clone)]
pub struct TagAnnotator {
    /// Evaluated in order; every match contributes its tag
    topics: Vec<(Regex, &'static str)>,
    default_tag: &'static str,
    /// Minimum tag column width, in characters
    width: usize,
}

/// Topic patterns and their tags, in evaluation order
const TOPICS: &[(&str, &str)] = &[
    (r"(?i)\sdown", "👎"),
    (r"(?i)\sup", "👍"),
    (r"(?i)ssh", "🤿"),
    (r"(?i)bgp", "🦉"),
    (r"(?i)ntp", "🕘"),
    (r"(?i)commit|config_i", "🙏"),
    (r"(?i)low_rx_power|signal", "📶"),
];

const DEFAULT_TAG: &str = "🤷";

impl Default for TagAnnotator {
    fn default() -> Self {
        let topics = TOPICS
            .iter()
            .map(|(pattern, tag)| (Regex::new(pattern).expect("valid topic pattern"), *tag))
            .collect();

        Self {
            topics,
            default_tag: DEFAULT_TAG,
            width: 3,
        }
    }
}

impl TagAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags matched by a line, in evaluation order
    pub fn tags_for(&self, line: &str) -> Vec<&'static str> {
        self.topics
            .iter()
            .filter(|(re, _)| re.is_match(line))
            .map(|(_, tag)| *tag)
            .collect()
    }
}

impl Annotate for TagAnnotator {
    fn annotate(&self, line: &str) -> String {
        let tags = self.tags_for(line);
        let tag = if tags.is_empty() {
            self.default_tag.to_string()
        } else {
            tags.concat()
        };

        format!("{:<width$} {}", tag, line, width = self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(hosttimestamp: &str, message: &str) -> LogSource {
        LogSource {
            facility: "LINK".to_string(),
            mnemonic: "UPDOWN".to_string(),
            message: message.to_string(),
            hosttimestamp: hosttimestamp.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_without_origin_timestamp() {
        let line = render_record(&source("", "plain message"));
        assert_eq!(line, "plain message\n");
    }

    #[test]
    fn test_render_with_origin_timestamp() {
        let line = render_record(&source("2024-01-02T10:30:00.123+03:00", "Interface Gi0/1 down"));
        let expected = format!(
            "\x1b[91m{:<20} {:<10} {:<20}\x1b[0m\nInterface Gi0/1 down\n",
            "2024-01-02 10:30:00", "LINK", "UPDOWN"
        );
        assert_eq!(line, expected);
    }

    #[test]
    fn test_render_cid_message_strips_prefix() {
        let line = render_record(&source("2024-01-02T10:30:00", "CID=0x1f2e; Config saved"));
        assert!(line.ends_with("\n Config saved\n"));
        assert!(!line.contains("CID=0x"));

        // No separator, keep the whole message
        let line = render_record(&source("2024-01-02T10:30:00", "CID=0x1f2e only"));
        assert!(line.ends_with("\nCID=0x1f2e only\n"));
    }

    #[test]
    fn test_up_tag() {
        let annotator = TagAnnotator::new();
        assert_eq!(annotator.tags_for("Line protocol on interface up"), vec!["👍"]);
        assert!(annotator.annotate("interface up").starts_with("👍"));
    }

    #[test]
    fn test_default_tag_only_when_nothing_matches() {
        let annotator = TagAnnotator::new();
        let tagged = annotator.annotate("fan tray inserted");
        assert!(tagged.starts_with(DEFAULT_TAG));
        assert!(tagged.ends_with(" fan tray inserted"));
        for (_, tag) in TOPICS {
            assert!(!tagged.contains(tag));
        }

        let tagged = annotator.annotate("BGP neighbor x");
        assert!(!tagged.contains(DEFAULT_TAG));
    }

    #[test]
    fn test_multiple_tags_in_order() {
        let annotator = TagAnnotator::new();
        let tags = annotator.tags_for("BGP session over SSH went DOWN, low_rx_power");
        assert_eq!(tags, vec!["👎", "🤿", "🦉", "📶"]);

        let tagged = annotator.annotate("commit by admin; NTP sync");
        assert!(tagged.starts_with("🕘🙏 "));
    }

    #[test]
    fn test_keyword_needs_leading_whitespace() {
        let annotator = TagAnnotator::new();
        assert!(annotator.tags_for("setup complete").is_empty());
        assert!(annotator.tags_for("shutdown requested").is_empty());
        assert_eq!(annotator.tags_for("link\tdown"), vec!["👎"]);
    }

    #[test]
    fn test_tag_column_is_padded() {
        let annotator = TagAnnotator::new();
        let tagged = annotator.annotate("x");
        assert_eq!(tagged, format!("{:<3} x", DEFAULT_TAG));
    }
}
