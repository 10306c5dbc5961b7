//! Query Construction
//!
//! Turns a small set of selection criteria into the structured boolean query
//! the search backend expects:
//!
//! - **criteria**: validated selection (hosts, window, term, cap, sort)
//! - **ast**: typed clause tree serialized at the gateway boundary
//!
//! # Body shape
//!
//! ```text
//! size: <cap>
//! query.bool.must:   terms{host: [addresses]} | match_all
//! query.bool.filter: [simple_query_string on message]?
//!                    [range @timestamp >= now-Nm/m]?
//!                    [range @timestamp >= now-Nd/d]?
//!                    [range @timestamp begin..=end, format, time_zone]?
//! sort: [@timestamp: asc|desc]
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use logsift::query::{QueryCriteria, SearchBody, SortOrder};
//!
//! let criteria = QueryCriteria::builder()
//!     .selected_addresses(["10.0.0.1".to_string()])
//!     .relative(Some("7d"))
//!     .term(Some("BGP"))
//!     .size(200)
//!     .sort(SortOrder::Desc)
//!     .build()?;
//!
//! let body = SearchBody::from_criteria(&criteria);
//! println!("{}", body.to_json_pretty()?);
//! ```

mod ast;
mod criteria;
mod error;

pub use ast::{
    BoolQuery, Clause, MatchAll, QueryRoot, RangeBounds, SearchBody, SimpleQueryString, SortSpec,
    HOST_FIELD, MESSAGE_FIELD, TIMESTAMP_FIELD,
};
pub use criteria::{CriteriaBuilder, DateFormat, QueryCriteria, SortOrder, TimeWindow};
pub use error::{QueryError, QueryResult};
