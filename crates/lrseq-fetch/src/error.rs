//! Error types for lrseq-fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[cfg(feature = "reqwest")]
    #[error(transparent)]
    Client(#[from] crate::effects::ClientSettingError),
}

impl FetchError {
    pub(crate) fn network<E>(url: &str, e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            url: url.to_string(),
            source: Box::new(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
