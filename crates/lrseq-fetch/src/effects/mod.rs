//! I/O operations for fetching.
//!
//! Everything that touches the network or the filesystem lives here, behind
//! the [`HttpClient`] trait so the fetcher can be driven by test doubles.

mod fetcher;
mod fs;
mod http;

pub use fetcher::Fetcher;
pub use fs::FsClient;
pub use http::{BoxStream, HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use http::{ClientSetting, ClientSettingError, ReqwestClient};
