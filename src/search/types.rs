//! Search response types
//!
//! Mirrors the `_search` response body. Every field of the hit source is
//! defaulted so a sparse document still deserializes. Text fields that the
//! backend sends as `null` read as empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level `_search` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(rename = "_shards", default)]
    pub shards: ShardStats,
    pub hits: HitsEnvelope,
}

impl SearchResponse {
    /// Total matching documents, independent of the result cap
    pub fn total(&self) -> u64 {
        self.hits.total.value
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardStats {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub total: TotalHits,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// Hit count with its relation qualifier (`eq` or `gte`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relation: String,
}

/// A single retrieved record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index", default, deserialize_with = "null_as_empty")]
    pub index: String,
    #[serde(rename = "_id", default, deserialize_with = "null_as_empty")]
    pub id: String,
    /// Null when results are sorted
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: LogSource,
}

/// Syslog document stored in the index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSource {
    /// Sender address
    #[serde(default, deserialize_with = "null_as_empty")]
    pub host: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ident: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub facility: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub severity: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mnemonic: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logflag: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    /// Timestamp reported by the device
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hosttimestamp: String,
    /// Time the record was indexed
    #[serde(rename = "@timestamp", default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_response() {
        let body = r#"{
            "took": 12,
            "timed_out": false,
            "_shards": {"total": 3, "successful": 3, "skipped": 0, "failed": 0},
            "hits": {
                "total": {"value": 1204, "relation": "gte"},
                "max_score": null,
                "hits": [{
                    "_index": "syslog-2024.01.02",
                    "_id": "a1",
                    "_score": null,
                    "_source": {
                        "host": "10.0.0.1",
                        "facility": "BGP",
                        "severity": "notice",
                        "mnemonic": "ADJCHANGE",
                        "message": "neighbor 10.1.1.1 Down",
                        "hosttimestamp": "2024-01-02T10:30:00.123+03:00",
                        "@timestamp": "2024-01-02T07:30:01Z"
                    },
                    "sort": [1704180601000]
                }]
            }
        }"#;

        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.total(), 1204);
        assert_eq!(resp.hits.total.relation, "gte");
        assert_eq!(resp.shards.total, 3);
        assert_eq!(resp.hits.hits.len(), 1);

        let hit = &resp.hits.hits[0];
        assert_eq!(hit.index, "syslog-2024.01.02");
        assert!(hit.score.is_none());
        assert_eq!(hit.source.host, "10.0.0.1");
        assert_eq!(hit.source.mnemonic, "ADJCHANGE");
        assert!(hit.source.tag.is_empty());
        assert!(hit.source.timestamp.is_some());
    }

    #[test]
    fn test_null_source_fields() {
        let body = r#"{"hits":{"total":{"value":1},"hits":[{"_source":{"host":"10.0.0.1","tag":null}}]}}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.total(), 1);

        let source = &resp.hits.hits[0].source;
        assert_eq!(source.host, "10.0.0.1");
        assert!(source.tag.is_empty());

        let body = r#"{"hits":{"total":{"value":2,"relation":null},"hits":[{
            "_index": null,
            "_id": null,
            "_source": {"host": null, "message": null, "mnemonic": "UPDOWN", "@timestamp": null}
        }]}}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert!(resp.hits.total.relation.is_empty());

        let hit = &resp.hits.hits[0];
        assert!(hit.index.is_empty());
        assert!(hit.id.is_empty());
        assert!(hit.source.host.is_empty());
        assert!(hit.source.message.is_empty());
        assert_eq!(hit.source.mnemonic, "UPDOWN");
        assert!(hit.source.timestamp.is_none());
    }

    #[test]
    fn test_missing_hits_is_an_error() {
        assert!(serde_json::from_str::<SearchResponse>(r#"{"took": 1}"#).is_err());
    }
}
