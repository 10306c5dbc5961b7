//! # Logsift
//!
//! Syslog retrieval front end. Given a set of target hosts and time/content
//! criteria it builds a structured search query, fetches matching records
//! from the log-indexing backend, drops operator-defined noise, tags each
//! record with a topic emoji and prints one box per host.
//!
//! ## Modules
//!
//! - [`config`]: inventory directory (settings, hosts, ignore rules)
//! - [`hosts`]: host selection, resolution and lookup tables
//! - [`query`]: criteria validation and the typed query body
//! - [`search`]: HTTPS gateway to the search backend
//! - [`filter`]: ignore-rule engine
//! - [`annotate`]: line rendering and topic tags
//! - [`pipeline`]: search → filter → tag → group
//! - [`present`]: terminal boxes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logsift::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inventory = Inventory::load_dir(&Inventory::default_dir())?;
//!
//!     let selection = HostSelection::new(vec!["core".to_string()], Vec::new());
//!     let directory = HostDirectory::build(&inventory.hosts, &selection, &SystemResolver);
//!
//!     let criteria = QueryCriteria::builder()
//!         .selected_addresses(directory.addresses())
//!         .relative(Some("60"))
//!         .size(inventory.config.display.max_records)
//!         .build()?;
//!
//!     let client = SearchClient::new(SearchClientConfig {
//!         urls: inventory.config.search.urls.clone(),
//!         username: inventory.config.search.username.clone(),
//!         password: StaticPassword("secret".into()).password()?,
//!         ..Default::default()
//!     })?;
//!
//!     let annotator = TagAnnotator::new();
//!     let pipeline = Pipeline {
//!         gateway: &client,
//!         index_patterns: &inventory.config.search.index_patterns,
//!         directory: &directory,
//!         ignore: IgnoreEngine::new(&inventory.ignore_rules, inventory.config.ignore.enabled),
//!         annotator: &annotator,
//!     };
//!
//!     let report = pipeline.run(&criteria).await?;
//!     print!("{}", BoxPresenter::new(120).render(&report));
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod config;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod hosts;
pub mod pipeline;
pub mod present;
pub mod query;
pub mod search;

// Re-export top-level types for convenience
pub use annotate::{render_record, Annotate, TagAnnotator};
pub use config::{Config, ConfigError, HostEntry, Inventory};
pub use credentials::{CredentialError, EnvOrPrompt, PasswordSource, StaticPassword};
pub use error::LogsiftError;
pub use filter::{IgnoreEngine, IgnoreRule};
pub use hosts::{HostDirectory, HostRecord, HostSelection, Resolve, SystemResolver};
pub use pipeline::{HostGroups, Pipeline, Report};
pub use present::{terminal_width, BoxPresenter};
pub use query::{QueryCriteria, QueryError, SearchBody, SortOrder, TimeWindow};
pub use search::{
    LogSource, SearchClient, SearchClientConfig, SearchError, SearchGateway, SearchResponse,
};
