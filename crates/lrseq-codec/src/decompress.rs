use std::io::Read;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::detect::{Compression, detect_compression};
use crate::error::{DecompressError, Result};

/// Decompress `data` according to its magic bytes.
///
/// Payloads without a known signature are returned unchanged.
pub fn decompress(data: Vec<u8>) -> Result<Vec<u8>> {
    let compression = detect_compression(&data);
    decode(data, compression)
}

/// Decompress `data` that is expected to be in `compression` format.
///
/// Fails with [`DecompressError::NotCompressed`] if the payload does not
/// carry the expected signature.
pub fn decompress_as(data: Vec<u8>, compression: Compression) -> Result<Vec<u8>> {
    if compression != Compression::None && detect_compression(&data) != compression {
        return Err(DecompressError::NotCompressed {
            expected: compression,
        });
    }
    decode(data, compression)
}

fn decode(data: Vec<u8>, compression: Compression) -> Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(data),
        Compression::Gzip => {
            let mut out = Vec::with_capacity(data.len().saturating_mul(4));
            MultiGzDecoder::new(data.as_slice())
                .read_to_end(&mut out)
                .map_err(|source| DecompressError::Corrupted {
                    compression,
                    source,
                })?;
            debug!(compressed = data.len(), decompressed = out.len(), "gzip decoded");
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression as Level;
    use flate2::write::GzEncoder;

    use super::*;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Level::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn gzip_payload_is_decoded() {
        let payload = br#"[{"sample_id":"SRR1"}]"#;
        assert_eq!(decompress(gzip(payload)).unwrap(), payload);
    }

    #[test]
    fn plain_payload_passes_through() {
        let payload = b"[]".to_vec();
        assert_eq!(decompress(payload.clone()).unwrap(), payload);
    }

    #[test]
    fn truncated_gzip_is_corrupted() {
        let mut data = gzip(b"[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]");
        data.truncate(data.len() / 2);
        let err = decompress(data).unwrap_err();
        assert!(matches!(
            err,
            DecompressError::Corrupted {
                compression: Compression::Gzip,
                ..
            }
        ));
    }

    #[test]
    fn garbage_after_magic_is_corrupted() {
        let data = vec![0x1F, 0x8B, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(decompress(data).is_err());
    }

    #[test]
    fn expected_gzip_but_plain() {
        let err = decompress_as(b"[]".to_vec(), Compression::Gzip).unwrap_err();
        assert!(matches!(err, DecompressError::NotCompressed { .. }));
        assert_eq!(err.to_string(), "payload is not gzip compressed");
    }

    #[test]
    fn concatenated_members_are_joined() {
        let mut data = gzip(b"[1,");
        data.extend(gzip(b"2]"));
        assert_eq!(decompress(data).unwrap(), b"[1,2]");
    }

    #[test]
    fn decoding_is_deterministic() {
        let data = gzip(br#"[{"read_count":10},{"read_count":20}]"#);
        assert_eq!(
            decompress(data.clone()).unwrap(),
            decompress(data).unwrap()
        );
    }
}
