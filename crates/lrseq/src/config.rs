use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use lrseq_fetch::ClientSetting;
use lrseq_loader::LoaderConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "lrseq.toml";
pub const ENV_PREFIX: &str = "LRSEQ_";

/// Everything the binary reads from `lrseq.toml` and `LRSEQ_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub loader: LoaderConfig,
    pub proxies: Vec<String>,
    /// Connect limit and longest tolerated stall while reading a body.
    /// Slow transfers that keep making progress are never cut off.
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            proxies: Vec::new(),
            timeout_secs: Some(60),
        }
    }
}

impl Settings {
    /// Defaults, then the config file, then the environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => {
                anyhow::ensure!(path.is_file(), "config file not found: {}", path.display());
                path
            }
            None => Path::new(CONFIG_FILE),
        };
        Self::extract(
            Figment::from(Serialized::defaults(Settings::default()))
                .merge(Toml::file(file))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn extract(figment: Figment) -> anyhow::Result<Self> {
        figment
            .extract()
            .context("failed to read lrseq configuration")
    }

    pub fn client_setting(&self) -> anyhow::Result<ClientSetting> {
        let proxies = self
            .proxies
            .iter()
            .map(|p| reqwest::Url::parse(p).with_context(|| format!("invalid proxy URL: {p}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let timeout = self.timeout_secs.map(Duration::from_secs);
        Ok(ClientSetting {
            proxies: (!proxies.is_empty()).then_some(proxies),
            connect_timeout: timeout,
            read_timeout: timeout,
        })
    }

    /// Whether the base URL needs the HTTP client rather than the filesystem.
    pub fn is_remote(&self) -> bool {
        let base = self.loader.base_url.as_str();
        base.starts_with("http://") || base.starts_with("https://")
    }
}
