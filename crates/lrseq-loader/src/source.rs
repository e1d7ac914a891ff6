use std::collections::BTreeMap;
use std::time::Duration;

use lrseq_codec::Compression;
use lrseq_fetch::FetchOptions;
use serde::{Deserialize, Serialize};

use crate::LoadError;

/// Where a dataset variant's payload lives, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantSource {
    /// One (optionally gzip compressed) JSON array.
    File { path: String },
    /// A JSON manifest listing chunk file names found under `chunk_dir`.
    Chunked { manifest: String, chunk_dir: String },
}

impl VariantSource {
    pub fn file(path: impl Into<String>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn chunked(manifest: impl Into<String>, chunk_dir: impl Into<String>) -> Self {
        Self::Chunked {
            manifest: manifest.into(),
            chunk_dir: chunk_dir.into(),
        }
    }
}

/// A variant with every location joined onto the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    File {
        url: String,
        /// `None` means detect from the payload.
        compression: Option<Compression>,
    },
    Chunked {
        manifest_url: String,
        chunk_base: String,
    },
}

impl ResolvedSource {
    pub(crate) fn chunk_url(chunk_base: &str, name: &str) -> String {
        join_url(chunk_base, name)
    }
}

/// Loader settings. Every field has a default, so partial config files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix joined onto every variant path. Empty means paths are used as is.
    pub base_url: String,
    pub variants: BTreeMap<String, VariantSource>,
    /// Request headers sent with every fetch, e.g. an `Authorization` token
    /// for a private mirror.
    pub headers: BTreeMap<String, String>,
    /// Try the dedicated worker thread before loading on the caller's task.
    pub use_worker: bool,
    /// How long the done state stays visible before a load resolves.
    pub done_dwell_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let variants = BTreeMap::from([
            (
                "bacteria".to_string(),
                VariantSource::file("data_bacteria.json.gz"),
            ),
            (
                "metagenome".to_string(),
                VariantSource::file("data_metagenome.json.gz"),
            ),
            (
                "chunks".to_string(),
                VariantSource::chunked("assets/data/chunks/files.json", "assets/data/chunks"),
            ),
        ]);
        Self {
            base_url: String::new(),
            variants,
            headers: BTreeMap::new(),
            use_worker: true,
            done_dwell_ms: 300,
        }
    }
}

impl LoaderConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_variant(mut self, name: impl Into<String>, source: VariantSource) -> Self {
        self.variants.insert(name.into(), source);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_worker(mut self, use_worker: bool) -> Self {
        self.use_worker = use_worker;
        self
    }

    pub fn with_done_dwell(mut self, dwell: Duration) -> Self {
        self.done_dwell_ms = u64::try_from(dwell.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn done_dwell(&self) -> Duration {
        Duration::from_millis(self.done_dwell_ms)
    }

    pub(crate) fn fetch_options(&self) -> FetchOptions {
        self.headers
            .iter()
            .fold(FetchOptions::default(), |options, (name, value)| {
                options.header(name.as_str(), value.as_str())
            })
    }

    pub fn resolve(&self, variant: &str) -> Result<ResolvedSource, LoadError> {
        let source = self
            .variants
            .get(variant)
            .ok_or_else(|| LoadError::UnknownVariant(variant.to_string()))?;

        Ok(match source {
            VariantSource::File { path } => ResolvedSource::File {
                url: join_url(&self.base_url, path),
                compression: path.ends_with(".gz").then_some(Compression::Gzip),
            },
            VariantSource::Chunked {
                manifest,
                chunk_dir,
            } => ResolvedSource::Chunked {
                manifest_url: join_url(&self.base_url, manifest),
                chunk_base: join_url(&self.base_url, chunk_dir),
            },
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_without_doubling_slashes() {
        assert_eq!(join_url("https://x.org/", "/a.json"), "https://x.org/a.json");
        assert_eq!(join_url("https://x.org", "a.json"), "https://x.org/a.json");
        assert_eq!(join_url("", "a.json"), "a.json");
    }

    #[test]
    fn gz_suffix_forces_gzip() {
        let config = LoaderConfig::default().with_base_url("https://host/data");
        assert_eq!(
            config.resolve("bacteria").unwrap(),
            ResolvedSource::File {
                url: "https://host/data/data_bacteria.json.gz".into(),
                compression: Some(Compression::Gzip),
            }
        );

        let config = config.with_variant("plain", VariantSource::file("x.json"));
        let ResolvedSource::File { compression, .. } = config.resolve("plain").unwrap() else {
            panic!("expected a single file source");
        };
        assert_eq!(compression, None);
    }

    #[test]
    fn unknown_variant_is_an_error() {
        let err = LoaderConfig::default().resolve("viral").unwrap_err();
        assert!(matches!(err, LoadError::UnknownVariant(name) if name == "viral"));
    }

    #[test]
    fn headers_become_fetch_options() {
        let options = LoaderConfig::default()
            .with_header("Authorization", "Bearer t0ken")
            .with_header("Accept", "application/json")
            .fetch_options();
        assert_eq!(
            &*options.headers,
            &[
                ("Accept".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Bearer t0ken".to_string()),
            ]
        );
        assert!(LoaderConfig::default().fetch_options().headers.is_empty());
    }

    #[test]
    fn chunked_sources_resolve_both_locations() {
        let resolved = LoaderConfig::default()
            .with_base_url("http://localhost:8000")
            .resolve("chunks")
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedSource::Chunked {
                manifest_url: "http://localhost:8000/assets/data/chunks/files.json".into(),
                chunk_base: "http://localhost:8000/assets/data/chunks".into(),
            }
        );
        assert_eq!(
            ResolvedSource::chunk_url("http://localhost:8000/assets/data/chunks", "c0.json"),
            "http://localhost:8000/assets/data/chunks/c0.json"
        );
    }
}
