use bytes::Bytes;
use futures_util::StreamExt;
use tracing::debug;

use crate::data::{FetchOptions, FetchPhase, Progress};
use crate::effects::http::{BoxStream, HttpClient};
use crate::error::{FetchError, Result};

/// Upper bound for the initial buffer reservation, whatever the server
/// declares.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Fetches whole resources into memory.
pub struct Fetcher<C: HttpClient> {
    client: C,
    options: FetchOptions,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            options: FetchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch `url` into a buffer.
    ///
    /// When the response declares its length the body is streamed and a
    /// [`FetchPhase::Downloading`] snapshot is reported after every chunk.
    /// Otherwise the body is read in one piece and only the final
    /// [`FetchPhase::Completed`] snapshot is reported, with an unknown total.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.is_empty() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        self.report(Progress::new(FetchPhase::Connecting, 0, None));

        let response = self
            .client
            .stream(url, &self.options.headers)
            .await
            .map_err(|e| FetchError::network(url, e))?;

        if !(200..300).contains(&response.status) {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        match response.content_length {
            Some(total) => self.read_streaming(url, response.body, total).await,
            None => self.read_whole(url, response.body).await,
        }
    }

    async fn read_streaming(
        &self,
        url: &str,
        mut body: BoxStream<'static, std::result::Result<Bytes, C::Error>>,
        total: u64,
    ) -> Result<Vec<u8>> {
        debug!(url, total, "streaming response body");
        let mut buf = Vec::with_capacity(total.min(MAX_PREALLOC) as usize);

        self.report(Progress::new(FetchPhase::Downloading, 0, Some(total)));
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| FetchError::network(url, e))?;
            buf.extend_from_slice(&chunk);
            self.report(Progress::new(
                FetchPhase::Downloading,
                buf.len() as u64,
                Some(total),
            ));
        }

        self.report(Progress::new(
            FetchPhase::Completed,
            buf.len() as u64,
            Some(total),
        ));
        Ok(buf)
    }

    async fn read_whole(
        &self,
        url: &str,
        mut body: BoxStream<'static, std::result::Result<Bytes, C::Error>>,
    ) -> Result<Vec<u8>> {
        debug!(url, "no content length declared, buffering whole body");
        let mut buf = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| FetchError::network(url, e))?;
            buf.extend_from_slice(&chunk);
        }

        self.report(Progress::new(FetchPhase::Completed, buf.len() as u64, None));
        Ok(buf)
    }

    fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.options.on_progress {
            callback(&progress);
        }
    }
}
