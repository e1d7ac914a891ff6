use std::io;
use std::sync::Arc;

use lrseq_dataset::{AggregateStats, Dataset};
use lrseq_fetch::{FetchOptions, HttpClient};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::progress::{ProgressEvent, ProgressObserver, ProgressReporter, Stage};
use crate::source::{LoaderConfig, ResolvedSource};
use crate::stages::{self, checkpoint};
use crate::worker::{self, RuntimeFactory, Worker};
use crate::LoadError;

/// Where loaded data ends up. Only called after acquisition succeeded, so a
/// failed load leaves whatever was rendered before untouched.
pub trait RenderTarget: Send {
    fn render(&mut self, dataset: &Dataset);

    fn plots(&mut self, stats: &AggregateStats);
}

/// Which execution context acquired the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    Worker,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    pub stats: AggregateStats,
    pub path: ExecutionPath,
}

/// Runs loads end to end: acquire, render, aggregate, report.
pub struct Pipeline<C> {
    client: Arc<C>,
    config: LoaderConfig,
    reporter: ProgressReporter,
    runtime: RuntimeFactory,
}

impl<C> Pipeline<C>
where
    C: HttpClient + 'static,
{
    pub fn new(client: C, config: LoaderConfig) -> Self {
        Self {
            client: Arc::new(client),
            config,
            reporter: ProgressReporter::new(),
            runtime: Arc::new(worker::current_thread_runtime),
        }
    }

    /// Replaces how the worker thread builds its runtime. The default is a
    /// current-thread runtime with I/O and timers enabled.
    pub fn with_runtime(
        mut self,
        factory: impl Fn() -> io::Result<Runtime> + Send + Sync + 'static,
    ) -> Self {
        self.runtime = Arc::new(factory);
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn subscribe(&mut self, observer: impl ProgressObserver + 'static) {
        self.reporter.subscribe(observer);
    }

    pub fn progress(&self) -> &ProgressEvent {
        self.reporter.state()
    }

    /// Loads `variant` and hands it to `target`.
    ///
    /// Progress restarts at 0% and ends in exactly one of `done`, `error` or
    /// `cancelled`. On success the done state is held for the configured
    /// dwell before returning.
    #[instrument(skip(self, target, cancel))]
    pub async fn load<R>(
        &mut self,
        variant: &str,
        target: &mut R,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome, LoadError>
    where
        R: RenderTarget,
    {
        self.reporter.reset();
        let result = self.run(variant, target, cancel).await;
        match &result {
            Ok(outcome) => info!(
                records = outcome.dataset.len(),
                path = ?outcome.path,
                "load finished"
            ),
            Err(LoadError::Cancelled) => {
                info!("load cancelled");
                self.reporter.cancelled();
            }
            Err(e) => {
                warn!(error = %e, "load failed");
                self.reporter.fail(e.to_string());
            }
        }
        result
    }

    async fn run<R>(
        &mut self,
        variant: &str,
        target: &mut R,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome, LoadError>
    where
        R: RenderTarget,
    {
        let source = self.config.resolve(variant)?;
        let (dataset, path) = self.acquire(source, cancel).await?;
        self.reporter
            .advance(Stage::Parsing, 1.0, format!("{} records", dataset.len()));

        checkpoint(cancel)?;
        self.reporter.enter(Stage::Rendering);
        tokio::task::yield_now().await;
        target.render(&dataset);

        checkpoint(cancel)?;
        self.reporter.enter(Stage::GeneratingPlots);
        tokio::task::yield_now().await;
        let stats = AggregateStats::compute(&dataset);
        target.plots(&stats);

        self.reporter.done();
        let dwell = self.config.done_dwell();
        if !dwell.is_zero() {
            tokio::time::sleep(dwell).await;
        }

        Ok(LoadOutcome {
            dataset,
            stats,
            path,
        })
    }

    async fn acquire(
        &mut self,
        source: ResolvedSource,
        cancel: &CancellationToken,
    ) -> Result<(Dataset, ExecutionPath), LoadError> {
        let options = self.config.fetch_options();
        if self.config.use_worker {
            let spawned = Worker::spawn(
                Arc::clone(&self.client),
                source.clone(),
                options.clone(),
                &self.runtime,
                cancel,
            )
            .await;
            match spawned {
                Ok(worker) => match worker.run(&mut self.reporter).await {
                    Ok(result) => return result.map(|dataset| (dataset, ExecutionPath::Worker)),
                    Err(e) => warn!(error = %e, "worker failed, loading on the current task"),
                },
                Err(e) => warn!(error = %e, "worker unavailable, loading on the current task"),
            }
        }

        self.acquire_inline(&source, &options, cancel)
            .await
            .map(|dataset| (dataset, ExecutionPath::Fallback))
    }

    async fn acquire_inline(
        &mut self,
        source: &ResolvedSource,
        options: &FetchOptions,
        cancel: &CancellationToken,
    ) -> Result<Dataset, LoadError> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = Arc::clone(&self.client);
        let reporter = &mut self.reporter;

        let work = async move {
            let result = stages::acquire(client, source, options, &tx, cancel).await;
            drop(tx);
            result
        };
        let relay = async {
            while let Some(update) = rx.recv().await {
                reporter.apply(update);
            }
        };

        let (result, ()) = tokio::join!(work, relay);
        result
    }
}

impl<C> std::fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}
