use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use lrseq_dataset::export::write_tsv;
use lrseq_dataset::{Platform, SampleFilter, StrategyFilter};
use lrseq_fetch::{FsClient, HttpClient, ReqwestClient};
use lrseq_loader::{CancellationToken, LoaderConfig, Pipeline};
use tracing::{debug, info};

use crate::config::Settings;
use crate::ui::tracker::ProgressTrackerBuilder;
use crate::ui::view::TerminalView;

#[derive(Debug, Clone, Args)]
pub struct LoadArg {
    /// Dataset variant, see `lrseq variants`.
    pub variant: String,

    /// Keep samples whose organism contains this text (case-insensitive).
    #[arg(long)]
    pub organism: Option<String>,

    /// Keep samples from this platform, e.g. OXFORD_NANOPORE or ONT.
    #[arg(long)]
    pub platform: Option<String>,

    /// Keep samples with this library strategy.
    #[arg(long, conflicts_with = "not_strategy")]
    pub strategy: Option<String>,

    /// Drop samples with this library strategy.
    #[arg(long)]
    pub not_strategy: Option<String>,

    /// Write the filtered samples to a TSV file.
    #[arg(long, value_name = "FILE.tsv")]
    pub export: Option<PathBuf>,
}

impl LoadArg {
    pub fn filter(&self) -> SampleFilter {
        let mut filter = SampleFilter::default();
        if let Some(organism) = &self.organism {
            filter = filter.organism(organism.clone());
        }
        if let Some(platform) = &self.platform {
            let Ok(platform) = platform.parse::<Platform>();
            filter = filter.platform(platform);
        }
        if let Some(strategy) = &self.strategy {
            filter = filter.library_strategy(StrategyFilter::Is(strategy.clone()));
        } else if let Some(strategy) = &self.not_strategy {
            filter = filter.library_strategy(StrategyFilter::IsNot(strategy.clone()));
        }
        filter
    }

    pub async fn run(&self, settings: Settings) -> anyhow::Result<()> {
        if settings.is_remote() {
            let client = ReqwestClient::new(settings.client_setting()?)
                .context("failed to build HTTP client")?;
            self.load_with(client, settings.loader).await
        } else {
            let root = match settings.loader.base_url.as_str() {
                "" => PathBuf::from("."),
                dir => PathBuf::from(dir),
            };
            debug!(root = %root.display(), "serving dataset from local directory");
            let config = settings.loader.with_base_url("");
            self.load_with(FsClient::new(root), config).await
        }
    }

    async fn load_with<C>(&self, client: C, config: LoaderConfig) -> anyhow::Result<()>
    where
        C: HttpClient + 'static,
    {
        let tracker = ProgressTrackerBuilder::default()
            .with_prefix("connecting")
            .with_finish(&format!("{} loaded", self.variant))
            .build();
        let mut pipeline = Pipeline::new(client, config);
        pipeline.subscribe(tracker.clone());

        let cancel = CancellationToken::new();
        let on_ctrl_c = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let mut view = TerminalView::new(self.filter());
        let result = pipeline.load(&self.variant, &mut view, &cancel).await;
        on_ctrl_c.abort();
        tracker.finish(result.is_ok());
        let outcome =
            result.with_context(|| format!("failed to load variant `{}`", self.variant))?;

        info!(
            loaded = outcome.dataset.len(),
            shown = view.stats().total,
            "dataset ready"
        );
        view.print();

        if let Some(path) = &self.export {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let rows = write_tsv(BufWriter::new(file), view.records())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("exported {rows} samples to {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg() -> LoadArg {
        LoadArg {
            variant: "bacteria".into(),
            organism: None,
            platform: None,
            strategy: None,
            not_strategy: None,
            export: None,
        }
    }

    #[test]
    fn no_flags_means_no_filter() {
        assert!(arg().filter().is_empty());
    }

    #[test]
    fn flags_map_onto_filter() {
        let filter = LoadArg {
            organism: Some("coli".into()),
            platform: Some("ONT".into()),
            not_strategy: Some("AMPLICON".into()),
            ..arg()
        }
        .filter();

        assert_eq!(filter.organism.as_deref(), Some("coli"));
        assert_eq!(filter.platform, Some(Platform::OxfordNanopore));
        assert_eq!(
            filter.library_strategy,
            Some(StrategyFilter::IsNot("AMPLICON".into()))
        );
    }
}
