//! Dataset acquisition: download, decompress, parse.
//!
//! Shared by the worker thread and the in-task fallback. Progress leaves
//! through an unbounded channel so neither side needs the reporter.

use std::sync::Arc;

use lrseq_codec::{decompress, decompress_as};
use lrseq_dataset::{Dataset, parse_manifest, parse_records};
use lrseq_fetch::{FetchOptions, FetchPhase, Fetcher, HttpClient, Progress};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::LoadError;
use crate::progress::{Stage, StageUpdate};
use crate::source::ResolvedSource;

pub(crate) type Updates = UnboundedSender<StageUpdate>;

/// Every request goes out with `options`' headers; progress callbacks are
/// installed per fetch.
pub(crate) async fn acquire<C>(
    client: Arc<C>,
    source: &ResolvedSource,
    options: &FetchOptions,
    updates: &Updates,
    cancel: &CancellationToken,
) -> Result<Dataset, LoadError>
where
    C: HttpClient + 'static,
{
    match source {
        ResolvedSource::File { url, compression } => {
            checkpoint(cancel)?;
            let raw = fetch(&client, url, options, Some(updates), cancel).await?;
            info!(url = %url, bytes = raw.len(), "downloaded dataset");

            enter(updates, Stage::Decompressing, cancel).await?;
            let json = match compression {
                Some(expected) => decompress_as(raw, *expected)?,
                None => decompress(raw)?,
            };

            enter(updates, Stage::Parsing, cancel).await?;
            Ok(parse_records(&json)?)
        }
        ResolvedSource::Chunked {
            manifest_url,
            chunk_base,
        } => acquire_chunks(&client, manifest_url, chunk_base, options, updates, cancel).await,
    }
}

/// Chunks are fetched, then decompressed, then parsed, so stages never
/// interleave. Records keep manifest order.
async fn acquire_chunks<C>(
    client: &Arc<C>,
    manifest_url: &str,
    chunk_base: &str,
    options: &FetchOptions,
    updates: &Updates,
    cancel: &CancellationToken,
) -> Result<Dataset, LoadError>
where
    C: HttpClient + 'static,
{
    checkpoint(cancel)?;
    let manifest = fetch(client, manifest_url, options, None, cancel).await?;
    let names = parse_manifest(&manifest)?;
    let total = names.len();
    info!(manifest = manifest_url, chunks = total, "loaded chunk manifest");

    let mut raw = Vec::with_capacity(total);
    for (i, name) in names.iter().enumerate() {
        checkpoint(cancel)?;
        let url = ResolvedSource::chunk_url(chunk_base, name);
        raw.push(fetch(client, &url, options, None, cancel).await?);
        step(updates, Stage::Downloading, i + 1, total);
    }

    enter(updates, Stage::Decompressing, cancel).await?;
    let mut decoded = Vec::with_capacity(total);
    for (i, chunk) in raw.into_iter().enumerate() {
        decoded.push(decompress(chunk)?);
        step(updates, Stage::Decompressing, i + 1, total);
    }

    enter(updates, Stage::Parsing, cancel).await?;
    let mut dataset = Dataset::default();
    for (i, chunk) in decoded.iter().enumerate() {
        dataset.append(parse_records(chunk)?);
        step(updates, Stage::Parsing, i + 1, total);
    }
    debug!(records = dataset.len(), "merged chunks");
    Ok(dataset)
}

async fn fetch<C>(
    client: &Arc<C>,
    url: &str,
    options: &FetchOptions,
    updates: Option<&Updates>,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, LoadError>
where
    C: HttpClient + 'static,
{
    let mut options = options.clone();
    if let Some(updates) = updates {
        let tx = updates.clone();
        options = options.on_progress(Arc::new(move |progress: &Progress| {
            if progress.phase != FetchPhase::Connecting {
                let _ = tx.send(StageUpdate::Bytes {
                    received: progress.bytes_received,
                    total: progress.total_bytes,
                });
            }
        }));
    }
    let fetcher = Fetcher::new(Arc::clone(client)).with_options(options);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LoadError::Cancelled),
        body = fetcher.fetch(url) => Ok(body?),
    }
}

async fn enter(
    updates: &Updates,
    stage: Stage,
    cancel: &CancellationToken,
) -> Result<(), LoadError> {
    checkpoint(cancel)?;
    step(updates, stage, 0, 1);
    tokio::task::yield_now().await;
    checkpoint(cancel)
}

fn step(updates: &Updates, stage: Stage, done: usize, total: usize) {
    let _ = updates.send(StageUpdate::Step { stage, done, total });
}

pub(crate) fn checkpoint(cancel: &CancellationToken) -> Result<(), LoadError> {
    if cancel.is_cancelled() {
        Err(LoadError::Cancelled)
    } else {
        Ok(())
    }
}
