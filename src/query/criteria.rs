//! Selection criteria
//!
//! A [`QueryCriteria`] is built once per invocation through
//! [`CriteriaBuilder`], which enforces the usage rules:
//!
//! - at least one target address (explicit `-i` list or a resolved host)
//! - at most one time-selection mode (relative `-t` or absolute `-d`)

use super::error::{QueryError, QueryResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Sort direction on the record timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Granularity of an absolute window, inferred from the begin value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `01/02/2024`
    Date,
    /// `01/02/2024:10`
    DateHour,
    /// `01/02/2024:10:30`
    DateHourMinute,
}

impl DateFormat {
    /// Infer the format from the shape of a begin boundary
    pub fn infer(begin: &str) -> Self {
        match begin.split(':').count() {
            1 => Self::Date,
            2 => Self::DateHour,
            _ => Self::DateHourMinute,
        }
    }

    /// Backend date pattern
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Date => "dd/MM/yyyy",
            Self::DateHour => "dd/MM/yyyy:HH",
            Self::DateHourMinute => "dd/MM/yyyy:HH:mm",
        }
    }
}

/// Time selection mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeWindow {
    /// Last N minutes, minute-aligned
    Minutes(u32),
    /// Since the start of the day N days ago
    Days(u32),
    /// Inclusive begin/end boundaries
    Absolute {
        begin: String,
        end: String,
        format: DateFormat,
        time_zone: String,
    },
}

fn days_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?i)(\d+)\s*d$").expect("valid days pattern"))
}

impl TimeWindow {
    /// Classify a raw `-t` value: `7d` is days, a bare number is minutes
    pub fn parse_relative(raw: &str) -> QueryResult<Self> {
        let raw = raw.trim();

        if let Some(caps) = days_pattern().captures(raw) {
            let days = caps[1]
                .parse()
                .map_err(|_| QueryError::InvalidTimeWindow(raw.to_string()))?;
            return Ok(Self::Days(days));
        }

        raw.parse()
            .map(Self::Minutes)
            .map_err(|_| QueryError::InvalidTimeWindow(format!("{raw:?} (use minutes like 30 or days like 7d)")))
    }

    /// Parse a raw `-d` value: `begin[,end]`, end defaults to begin
    pub fn parse_absolute(raw: &str, time_zone: &str) -> QueryResult<Self> {
        let mut parts = raw.split(',').map(str::trim);
        let begin = parts.next().unwrap_or_default();
        if begin.is_empty() {
            return Err(QueryError::InvalidTimeWindow(format!(
                "{raw:?} (use dd/MM/yyyy[:HH[:mm]][,end])"
            )));
        }

        let end = parts.next().filter(|e| !e.is_empty()).unwrap_or(begin);
        if parts.next().is_some() {
            return Err(QueryError::InvalidTimeWindow(format!(
                "{raw:?} has more than begin and end (use dd/MM/yyyy[:HH[:mm]][,end])"
            )));
        }

        Ok(Self::Absolute {
            begin: begin.to_string(),
            end: end.to_string(),
            format: DateFormat::infer(begin),
            time_zone: time_zone.to_string(),
        })
    }
}

/// Validated selection for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria {
    /// Addresses for the host terms clause, in selection order
    pub addresses: Vec<String>,
    /// Free-text term matched against the message field
    pub term: Option<String>,
    pub window: Option<TimeWindow>,
    /// Result cap
    pub size: u32,
    pub sort: SortOrder,
}

impl QueryCriteria {
    pub fn builder() -> CriteriaBuilder {
        CriteriaBuilder::default()
    }
}

/// Builder for [`QueryCriteria`]
#[derive(Debug, Clone)]
pub struct CriteriaBuilder {
    selected: Vec<String>,
    explicit: Vec<String>,
    term: Option<String>,
    relative: Option<String>,
    absolute: Option<String>,
    time_zone: String,
    size: u32,
    sort: SortOrder,
}

impl Default for CriteriaBuilder {
    fn default() -> Self {
        Self {
            selected: Vec::new(),
            explicit: Vec::new(),
            term: None,
            relative: None,
            absolute: None,
            time_zone: "+03:00".to_string(),
            size: 500,
            sort: SortOrder::Asc,
        }
    }
}

impl CriteriaBuilder {
    /// Addresses of the hosts picked from the directory. Unresolved (empty)
    /// addresses are skipped.
    pub fn selected_addresses<I>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.selected = addresses.into_iter().filter(|a| !a.is_empty()).collect();
        self
    }

    /// Explicit address list; replaces the selected addresses when non-empty
    pub fn explicit_addresses<I>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.explicit = addresses
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    pub fn term(mut self, term: Option<&str>) -> Self {
        self.term = term.filter(|t| !t.trim().is_empty()).map(str::to_string);
        self
    }

    /// Raw relative window (`30`, `7d`)
    pub fn relative(mut self, raw: Option<&str>) -> Self {
        self.relative = raw.filter(|r| !r.trim().is_empty()).map(str::to_string);
        self
    }

    /// Raw absolute window (`begin[,end]`)
    pub fn absolute(mut self, raw: Option<&str>) -> Self {
        self.absolute = raw.filter(|r| !r.trim().is_empty()).map(str::to_string);
        self
    }

    /// Offset applied to absolute windows
    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Validate and build
    pub fn build(self) -> QueryResult<QueryCriteria> {
        let addresses = if self.explicit.is_empty() {
            self.selected
        } else {
            self.explicit
        };
        if addresses.is_empty() {
            return Err(QueryError::Usage(
                "Need to select hosts with a resolvable address, options -i, -g, -a".to_string(),
            ));
        }

        let window = match (self.relative.as_deref(), self.absolute.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(QueryError::Usage("Need only one option: -t or -d".to_string()))
            }
            (Some(raw), None) => Some(TimeWindow::parse_relative(raw)?),
            (None, Some(raw)) => Some(TimeWindow::parse_absolute(raw, &self.time_zone)?),
            (None, None) => None,
        };

        Ok(QueryCriteria {
            addresses,
            term: self.term,
            window,
            size: self.size,
            sort: self.sort,
        })
    }
}
