use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Response head plus a streaming body.
pub struct HttpResponse<E> {
    /// Status code. Anything outside `200..300` is treated as a failure.
    pub status: u16,

    /// Declared body length (`Content-Length`), if any.
    pub content_length: Option<u64>,

    pub body: BoxStream<'static, Result<Bytes, E>>,
}

/// Asynchronous transport abstraction.
///
/// This trait provides the minimal interface the [`Fetcher`](crate::Fetcher)
/// needs. Implementations report non-success statuses through
/// [`HttpResponse::status`] and reserve `Err` for failures where no response
/// was received at all.
///
/// # Implementations
///
/// - [`ReqwestClient`]: HTTP(S) via `reqwest`
/// - [`FsClient`](crate::FsClient): relative paths under a local directory
pub trait HttpClient: Send + Sync {
    /// Error type for transport failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a GET request and return the response with its body as a stream.
    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse<Self::Error>, Self::Error>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    type Error = C::Error;

    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse<Self::Error>, Self::Error>> + Send {
        (**self).stream(url, headers)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::StreamExt;
    use reqwest::{Client, Proxy, Url};
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    pub enum ClientSettingError {
        #[error("invalid proxy URL {url}: {source}")]
        Proxy {
            url: String,
            #[source]
            source: reqwest::Error,
        },

        #[error("failed to build client: {0}")]
        Build(#[from] reqwest::Error),
    }

    /// Settings used to build the underlying `reqwest::Client`.
    ///
    /// There is no deadline for a whole request: large bodies may take as
    /// long as they need while bytes keep arriving.
    #[derive(Debug, Clone, Default)]
    pub struct ClientSetting {
        pub proxies: Option<Vec<Url>>,
        /// Limit for establishing the connection.
        pub connect_timeout: Option<Duration>,
        /// Limit for a single read, i.e. how long the transfer may stall.
        pub read_timeout: Option<Duration>,
    }

    impl ClientSetting {
        pub fn build(self) -> Result<Client, ClientSettingError> {
            let mut cb = Client::builder();

            if let Some(proxies) = self.proxies {
                let (secure, insecure): (Vec<Url>, Vec<Url>) =
                    proxies.into_iter().partition(|u| u.scheme() == "https");

                for u in secure {
                    cb = cb.proxy(Proxy::https(u.as_str()).map_err(|source| {
                        ClientSettingError::Proxy {
                            url: u.to_string(),
                            source,
                        }
                    })?);
                }

                for u in insecure {
                    cb = cb.proxy(Proxy::http(u.as_str()).map_err(|source| {
                        ClientSettingError::Proxy {
                            url: u.to_string(),
                            source,
                        }
                    })?);
                }
            }

            if let Some(timeout) = self.connect_timeout {
                cb = cb.connect_timeout(timeout);
            }
            if let Some(timeout) = self.read_timeout {
                cb = cb.read_timeout(timeout);
            }

            cb.build().map_err(ClientSettingError::Build)
        }
    }

    /// Production HTTP client implementation using reqwest.
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        pub fn new(setting: ClientSetting) -> Result<Self, ClientSettingError> {
            Ok(Self {
                client: setting.build()?,
            })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<HttpResponse<Self::Error>, Self::Error> {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            let content_length = response.content_length();
            let body = response.bytes_stream().map(|chunk| chunk.map(Bytes::from));

            Ok(HttpResponse {
                status,
                content_length,
                body: Box::pin(body),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientSetting, ClientSettingError, ReqwestClient};
