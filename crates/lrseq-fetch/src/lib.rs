//! Dataset transport with streaming progress.
//!
//! # Architecture
//!
//! - [`data`] - Immutable options and progress types
//! - [`effects`] - I/O behind the [`HttpClient`] trait
//!
//! # Key Features
//!
//! - **Streaming**: bodies with a declared length are read chunk by chunk and
//!   every chunk is reported as `(received, total)`
//! - **Coarse fallback**: bodies without a declared length are read whole and
//!   reported once
//! - **Mechanism-Only**: no retries and no UI; callers map progress and errors

mod data;
mod effects;
mod error;

pub use data::{FetchOptions, FetchPhase, Progress};
pub use effects::{BoxStream, Fetcher, FsClient, HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use effects::{ClientSetting, ClientSettingError, ReqwestClient};

pub use error::{FetchError, Result};
