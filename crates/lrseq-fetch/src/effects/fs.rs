use std::io;
use std::path::{Component, Path, PathBuf};

use tokio_util::io::ReaderStream;

use super::http::{HttpClient, HttpResponse};

/// Serves relative URLs from a local directory, e.g. a checkout of the
/// static site.
///
/// Files declare their length, so fetches through this client always
/// stream. Missing files answer with status 404 instead of an error, the
/// way a static web server would.
#[derive(Debug, Clone)]
pub struct FsClient {
    root: PathBuf,
}

impl FsClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> io::Result<PathBuf> {
        let relative = Path::new(url.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes dataset root: {url}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl HttpClient for FsClient {
    type Error = io::Error;

    async fn stream(
        &self,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<HttpResponse<Self::Error>, Self::Error> {
        let path = self.resolve(url)?;
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(HttpResponse {
                    status: 404,
                    content_length: Some(0),
                    body: Box::pin(futures_util::stream::empty()),
                });
            }
            Err(e) => return Err(e),
        };
        let len = file.metadata().await?.len();
        let body = ReaderStream::new(file);

        Ok(HttpResponse {
            status: 200,
            content_length: Some(len),
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_parent_components() {
        let client = FsClient::new("/srv/site");
        assert!(client.resolve("../etc/passwd").is_err());
        assert!(client.resolve("assets/../../x").is_err());
    }

    #[test]
    fn resolve_strips_leading_slash() {
        let client = FsClient::new("/srv/site");
        assert_eq!(
            client.resolve("/data_bacteria.json.gz").unwrap(),
            PathBuf::from("/srv/site/data_bacteria.json.gz")
        );
    }
}
