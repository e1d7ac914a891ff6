use lrseq_fetch::HttpClient;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::pipeline::{LoadOutcome, Pipeline, RenderTarget};
use crate::progress::ProgressEvent;
use crate::LoadError;

/// Shareable handle that allows one load at a time.
///
/// A load requested while another is running fails with
/// [`LoadError::Busy`] and does not disturb the running load's progress.
#[derive(Debug)]
pub struct Loader<C> {
    pipeline: Mutex<Pipeline<C>>,
}

impl<C> Loader<C>
where
    C: HttpClient + 'static,
{
    pub fn new(pipeline: Pipeline<C>) -> Self {
        Self {
            pipeline: Mutex::new(pipeline),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pipeline.try_lock().is_err()
    }

    /// Last progress state, or `None` while a load holds the pipeline.
    pub fn progress(&self) -> Option<ProgressEvent> {
        self.pipeline
            .try_lock()
            .ok()
            .map(|pipeline| pipeline.progress().clone())
    }

    pub async fn load<R>(
        &self,
        variant: &str,
        target: &mut R,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome, LoadError>
    where
        R: RenderTarget,
    {
        let Ok(mut pipeline) = self.pipeline.try_lock() else {
            debug!(variant, "rejected load, another one is in flight");
            return Err(LoadError::Busy);
        };
        pipeline.load(variant, target, cancel).await
    }
}
