//! Sample records and everything derived from them.
//!
//! - [`record`] - The record model and the [`Dataset`] container
//! - [`parse`] - Permissive JSON decoding of record arrays and chunk manifests
//! - [`filter`] - Conjunctive record predicates
//! - [`stats`] - Summary counts and positional box-plot summaries
//! - [`export`] - TSV rendering of a view
//! - [`history`] - Sample-count history kept alongside the published datasets

pub mod export;
pub mod filter;
pub mod history;
pub mod parse;
pub mod record;
pub mod stats;

mod error;

pub use error::{ParseError, TableError};
pub use filter::{SampleFilter, StrategyFilter};
pub use parse::{parse_manifest, parse_records};
pub use record::{Dataset, Platform, Record};
pub use stats::{AggregateStats, BoxSummary, Measure, OrganismCount, PlatformCount, Quartiles};
