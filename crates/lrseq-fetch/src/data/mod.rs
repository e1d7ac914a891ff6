//! Immutable data types for fetching.
//!
//! Options and progress snapshots are passed by value or reference between
//! the fetcher and its callers and are never mutated after construction.

pub mod options;
pub mod progress;

pub use options::{FetchOptions, FetchPhase};
pub use progress::Progress;
