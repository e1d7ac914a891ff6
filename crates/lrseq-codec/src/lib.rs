//! Compression detection and decompression for dataset payloads.
//!
//! - `detect.rs` - Compression detection from magic bytes
//! - `decompress.rs` - Single-pass, synchronous decoding

pub use decompress::{decompress, decompress_as};
pub use detect::{Compression, detect_compression};
pub use error::{DecompressError, Result};

mod decompress;
mod detect;
mod error;
