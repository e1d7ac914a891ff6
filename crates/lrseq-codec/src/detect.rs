use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "uncompressed"),
            Compression::Gzip => write!(f, "gzip"),
        }
    }
}

pub fn detect_compression(data: &[u8]) -> Compression {
    match data {
        [0x1F, 0x8B, ..] => Compression::Gzip,
        _ => Compression::None,
    }
}
