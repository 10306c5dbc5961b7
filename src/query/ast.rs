//! Query clause tree
//!
//! Typed mirror of the backend's boolean query DSL. Values only ever reach
//! the wire through `serde`, so a free-text term is escaped like any other
//! JSON string.

use super::criteria::{QueryCriteria, SortOrder, TimeWindow};
use super::error::QueryResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Document field holding the sender address
pub const HOST_FIELD: &str = "host";
/// Document field holding the free-text message
pub const MESSAGE_FIELD: &str = "message";
/// Document field holding the indexed timestamp
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// Complete request body for a `_search` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchBody {
    pub size: u32,
    pub query: QueryRoot,
    pub sort: Vec<BTreeMap<String, SortSpec>>,
}

/// `{"bool": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRoot {
    #[serde(rename = "bool")]
    pub bool_query: BoolQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolQuery {
    pub must: Clause,
    pub filter: Vec<Clause>,
}

/// A leaf query clause
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    MatchAll(MatchAll),
    Terms(BTreeMap<String, Vec<String>>),
    SimpleQueryString(SimpleQueryString),
    Range(BTreeMap<String, RangeBounds>),
}

/// Serializes as `{}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchAll {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleQueryString {
    pub query: String,
    pub fields: Vec<String>,
    pub flags: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SortSpec {
    pub order: SortOrder,
}

impl Clause {
    /// Host restriction: terms on the given addresses, or match-all when empty
    pub fn host_terms(addresses: &[String]) -> Self {
        if addresses.is_empty() {
            Self::MatchAll(MatchAll {})
        } else {
            Self::Terms(BTreeMap::from([(
                HOST_FIELD.to_string(),
                addresses.to_vec(),
            )]))
        }
    }

    /// Multi-term match on the message field with every operator enabled
    pub fn message_text(term: &str) -> Self {
        Self::SimpleQueryString(SimpleQueryString {
            query: term.to_string(),
            fields: vec![MESSAGE_FIELD.to_string()],
            flags: "ALL".to_string(),
        })
    }

    /// Timestamp range for a time window
    pub fn timestamp_range(window: &TimeWindow) -> Self {
        let bounds = match window {
            TimeWindow::Minutes(n) => RangeBounds {
                gte: Some(format!("now-{n}m/m")),
                ..Default::default()
            },
            TimeWindow::Days(n) => RangeBounds {
                gte: Some(format!("now-{n}d/d")),
                ..Default::default()
            },
            TimeWindow::Absolute {
                begin,
                end,
                format,
                time_zone,
            } => RangeBounds {
                gte: Some(begin.clone()),
                lte: Some(end.clone()),
                format: Some(format.pattern().to_string()),
                time_zone: Some(time_zone.clone()),
            },
        };

        Self::Range(BTreeMap::from([(TIMESTAMP_FIELD.to_string(), bounds)]))
    }
}

impl SearchBody {
    /// Build the body for validated criteria.
    ///
    /// Filters appear in a fixed order: message text, then the time window.
    pub fn from_criteria(criteria: &QueryCriteria) -> Self {
        let mut filter = Vec::new();

        if let Some(term) = &criteria.term {
            filter.push(Clause::message_text(term));
        }
        if let Some(window) = &criteria.window {
            filter.push(Clause::timestamp_range(window));
        }

        Self {
            size: criteria.size,
            query: QueryRoot {
                bool_query: BoolQuery {
                    must: Clause::host_terms(&criteria.addresses),
                    filter,
                },
            },
            sort: vec![BTreeMap::from([(
                TIMESTAMP_FIELD.to_string(),
                SortSpec {
                    order: criteria.sort,
                },
            )])],
        }
    }

    pub fn to_json_pretty(&self) -> QueryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for SearchBody {
    fn default() -> Self {
        Self {
            size: 10,
            query: QueryRoot {
                bool_query: BoolQuery {
                    must: Clause::MatchAll(MatchAll {}),
                    filter: Vec::new(),
                },
            },
            sort: vec![BTreeMap::from([(
                TIMESTAMP_FIELD.to_string(),
                SortSpec {
                    order: SortOrder::Asc,
                },
            )])],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn criteria() -> crate::query::CriteriaBuilder {
        QueryCriteria::builder().selected_addresses(vec!["10.0.0.1".to_string()])
    }

    fn to_value(body: &SearchBody) -> serde_json::Value {
        serde_json::to_value(body).unwrap()
    }

    #[test]
    fn test_host_terms() {
        let body = SearchBody::from_criteria(&criteria().size(100).build().unwrap());
        let value = to_value(&body);

        assert_eq!(value["size"], 100);
        assert_eq!(value["query"]["bool"]["must"], json!({"terms": {"host": ["10.0.0.1"]}}));
        assert_eq!(value["query"]["bool"]["filter"], json!([]));
        assert_eq!(value["sort"], json!([{"@timestamp": {"order": "asc"}}]));
    }

    #[test]
    fn test_no_addresses_is_match_all() {
        let value = serde_json::to_value(Clause::host_terms(&[])).unwrap();
        assert_eq!(value, json!({"match_all": {}}));
    }

    #[test]
    fn test_minutes_window() {
        let body = SearchBody::from_criteria(&criteria().relative(Some("15")).build().unwrap());
        assert_eq!(
            to_value(&body)["query"]["bool"]["filter"],
            json!([{"range": {"@timestamp": {"gte": "now-15m/m"}}}])
        );
    }

    #[test]
    fn test_days_window_is_day_aligned() {
        let body = SearchBody::from_criteria(&criteria().relative(Some("7d")).build().unwrap());
        assert_eq!(
            to_value(&body)["query"]["bool"]["filter"],
            json!([{"range": {"@timestamp": {"gte": "now-7d/d"}}}])
        );
    }

    #[test]
    fn test_absolute_window() {
        let body = SearchBody::from_criteria(
            &criteria()
                .absolute(Some("01/02/2024:10:30,01/02/2024:12:00"))
                .time_zone("+03:00")
                .build()
                .unwrap(),
        );
        assert_eq!(
            to_value(&body)["query"]["bool"]["filter"],
            json!([{"range": {"@timestamp": {
                "gte": "01/02/2024:10:30",
                "lte": "01/02/2024:12:00",
                "format": "dd/MM/yyyy:HH:mm",
                "time_zone": "+03:00"
            }}}])
        );
    }

    #[test]
    fn test_filter_order_and_sort() {
        let body = SearchBody::from_criteria(
            &criteria()
                .term(Some("neighbor \"Down\""))
                .relative(Some("1d"))
                .sort(SortOrder::Desc)
                .build()
                .unwrap(),
        );
        let value = to_value(&body);
        let filter = value["query"]["bool"]["filter"].as_array().unwrap();

        assert_eq!(filter.len(), 2);
        assert_eq!(
            filter[0],
            json!({"simple_query_string": {
                "query": "neighbor \"Down\"",
                "fields": ["message"],
                "flags": "ALL"
            }})
        );
        assert!(filter[1].get("range").is_some());
        assert_eq!(value["sort"][0]["@timestamp"]["order"], "desc");
    }

    #[test]
    fn test_pretty_json_escapes_term() {
        let body = SearchBody::from_criteria(&criteria().term(Some("a\"}, {\"x")).build().unwrap());
        let text = body.to_json_pretty().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed["query"]["bool"]["filter"][0]["simple_query_string"]["query"],
            "a\"}, {\"x"
        );
    }
}
