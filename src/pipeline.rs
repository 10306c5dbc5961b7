//! Retrieval pipeline
//!
//! One sequential pass per invocation:
//!
//! 1. build the search body from validated criteria
//! 2. single round-trip through the [`SearchGateway`]
//! 3. drop records matched by the ignore rules
//! 4. render and tag each surviving record exactly once
//! 5. group lines by host display name, keeping arrival order

use crate::annotate::{render_record, Annotate};
use crate::error::Result;
use crate::filter::IgnoreEngine;
use crate::hosts::HostDirectory;
use crate::query::{QueryCriteria, SearchBody};
use crate::search::{SearchGateway, SearchResponse, TotalHits};
use std::collections::BTreeMap;

/// Tagged lines per host display name
pub type HostGroups = BTreeMap<String, Vec<String>>;

/// Everything the presenter needs
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub groups: HostGroups,
    /// Backend hit count for the whole query
    pub total: TotalHits,
    /// Records returned in this page
    pub retrieved: usize,
    pub suppressed: usize,
    /// Configured result cap
    pub max_records: u32,
}

impl Report {
    pub fn shown(&self) -> usize {
        self.retrieved - self.suppressed
    }
}

/// Shared, read-only inputs of a run
pub struct Pipeline<'a, G: ?Sized, A> {
    pub gateway: &'a G,
    pub index_patterns: &'a [String],
    pub directory: &'a HostDirectory,
    pub ignore: IgnoreEngine<'a>,
    pub annotator: &'a A,
}

impl<'a, G, A> Pipeline<'a, G, A>
where
    G: SearchGateway + ?Sized,
    A: Annotate,
{
    /// Search and post-process
    pub async fn run(&self, criteria: &QueryCriteria) -> Result<Report> {
        let body = SearchBody::from_criteria(criteria);
        tracing::debug!("Query body: {}", body.to_json_pretty()?);

        let response = self.gateway.search(&body, self.index_patterns).await?;
        Ok(self.process(&response, criteria.size))
    }

    /// Filter, tag and group a search response
    pub fn process(&self, response: &SearchResponse, max_records: u32) -> Report {
        let mut report = Report {
            total: response.hits.total.clone(),
            retrieved: response.hits.hits.len(),
            max_records,
            ..Default::default()
        };

        for hit in &response.hits.hits {
            if self.ignore.suppress(&hit.source) {
                tracing::trace!("Suppressed {} from {}", hit.id, hit.source.host);
                report.suppressed += 1;
                continue;
            }

            let line = self.annotator.annotate(&render_record(&hit.source));
            report
                .groups
                .entry(self.directory.display_name(&hit.source.host))
                .or_default()
                .push(line);
        }

        if report.suppressed > 0 {
            tracing::info!(
                "Ignore rules suppressed {} of {} records",
                report.suppressed,
                report.retrieved
            );
        }

        report
    }
}
