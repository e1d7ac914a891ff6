//! Staged dataset loading.
//!
//! A load runs five stages in strict order and reports a single monotonic
//! progress narrative:
//!
//! | stage            | progress |
//! |------------------|----------|
//! | downloading      | 0–50     |
//! | decompressing    | 50–70    |
//! | parsing          | 70–85    |
//! | rendering        | 85–92    |
//! | generating-plots | 92–100   |
//!
//! Download, decompression and parsing run on a dedicated worker thread when
//! one can be started, and inline on the caller's task otherwise. Rendering
//! and aggregation always run on the caller's task.
//!
//! - [`progress`] - Stage weights, events and observers
//! - [`source`] - Dataset variants and URL resolution
//! - [`pipeline`] - The orchestrator and the rendering seam
//! - [`loader`] - Single-flight guard around a pipeline

pub mod loader;
pub mod pipeline;
pub mod progress;
pub mod source;

mod error;
mod stages;
mod worker;

pub use error::{EnvironmentError, LoadError};
pub use loader::Loader;
pub use pipeline::{ExecutionPath, LoadOutcome, Pipeline, RenderTarget};
pub use progress::{ProgressEvent, ProgressObserver, ProgressReporter, Stage};
pub use source::{LoaderConfig, ResolvedSource, VariantSource};
pub use worker::RuntimeFactory;

pub use tokio_util::sync::CancellationToken;
