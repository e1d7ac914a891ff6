use std::io;

use lrseq_codec::DecompressError;
use lrseq_dataset::ParseError;
use lrseq_fetch::FetchError;
use thiserror::Error;

/// Terminal failure of a load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unknown dataset variant: {0}")]
    UnknownVariant(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("decompression failed: {0}")]
    Decompress(#[from] DecompressError),

    #[error("parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("load cancelled")]
    Cancelled,

    #[error("another load is already in flight")]
    Busy,
}

/// The worker thread could not be used. Never surfaced to observers; the
/// pipeline falls back to loading on the caller's task.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("failed to spawn loader thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to start loader runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("loader thread exited without a result")]
    Disconnected,
}
