//! Record Filtering
//!
//! Operator-defined ignore rules that suppress known-benign log records
//! before they are tagged and displayed.

mod ignore;

pub use ignore::{IgnoreEngine, IgnoreRule};
