use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use lrseq_dataset::Dataset;
use lrseq_fetch::{FetchOptions, HttpClient};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::progress::{ProgressReporter, StageUpdate};
use crate::source::ResolvedSource;
use crate::{EnvironmentError, LoadError, stages};

const THREAD_NAME: &str = "lrseq-loader";

/// Builds the runtime the loader thread drives its work on. Called on that
/// thread; an error makes the pipeline load on the caller's task instead.
pub type RuntimeFactory = Arc<dyn Fn() -> io::Result<Runtime> + Send + Sync>;

pub(crate) fn current_thread_runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// A dedicated thread with its own single-threaded runtime, running one
/// acquisition and streaming progress back.
pub(crate) struct Worker {
    handle: Option<JoinHandle<()>>,
    updates: mpsc::UnboundedReceiver<StageUpdate>,
    result: oneshot::Receiver<Result<Dataset, LoadError>>,
    // Stops the thread at its next checkpoint if the load future is dropped.
    _cancel_on_drop: DropGuard,
}

impl Worker {
    /// Starts the thread and waits until its runtime is up.
    pub(crate) async fn spawn<C>(
        client: Arc<C>,
        source: ResolvedSource,
        options: FetchOptions,
        runtime: &RuntimeFactory,
        cancel: &CancellationToken,
    ) -> Result<Self, EnvironmentError>
    where
        C: HttpClient + 'static,
    {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (updates_tx, updates) = mpsc::unbounded_channel();
        let (result_tx, result) = oneshot::channel();
        let token = cancel.child_token();
        let thread_token = token.clone();
        let build_runtime = Arc::clone(runtime);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                let runtime = match build_runtime() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                let dataset = runtime.block_on(stages::acquire(
                    client,
                    &source,
                    &options,
                    &updates_tx,
                    &thread_token,
                ));
                let _ = result_tx.send(dataset);
            })
            .map_err(EnvironmentError::Spawn)?;

        let mut worker = Self {
            handle: Some(handle),
            updates,
            result,
            _cancel_on_drop: token.drop_guard(),
        };

        match ready_rx.await {
            Ok(Ok(())) => {
                debug!("loader thread started");
                Ok(worker)
            }
            Ok(Err(e)) => {
                worker.join().await;
                Err(EnvironmentError::Runtime(e))
            }
            Err(_) => {
                worker.join().await;
                Err(EnvironmentError::Disconnected)
            }
        }
    }

    /// Relays progress until the thread finishes, then joins it.
    ///
    /// The outer error means the thread died without producing a result;
    /// the inner one is an ordinary load failure.
    pub(crate) async fn run(
        mut self,
        reporter: &mut ProgressReporter,
    ) -> Result<Result<Dataset, LoadError>, EnvironmentError> {
        while let Some(update) = self.updates.recv().await {
            reporter.apply(update);
        }
        let result = (&mut self.result).await;
        self.join().await;
        result.map_err(|_| EnvironmentError::Disconnected)
    }

    async fn join(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match tokio::task::spawn_blocking(move || handle.join()).await {
            Ok(Ok(())) => debug!("loader thread joined"),
            Ok(Err(_)) => warn!("loader thread panicked"),
            Err(e) => warn!(error = %e, "failed to join loader thread"),
        }
    }
}
