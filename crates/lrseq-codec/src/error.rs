use std::io;

#[derive(Debug, thiserror::Error)]
pub enum DecompressError {
    #[error("{compression} stream is corrupted: {source}")]
    Corrupted {
        compression: crate::Compression,
        #[source]
        source: io::Error,
    },

    #[error("payload is not {expected} compressed")]
    NotCompressed { expected: crate::Compression },
}

pub type Result<T> = std::result::Result<T, DecompressError>;
