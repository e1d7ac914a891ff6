use crate::error::ParseError;
use crate::record::{Dataset, Record};

/// Decode `bytes` as UTF-8 and parse a JSON array of records.
///
/// Record order follows the document. Missing fields become `None`, unknown
/// fields are ignored; anything that is not an array of objects, or a known
/// field with the wrong type, is rejected.
pub fn parse_records(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let text = decode(bytes)?;
    let records: Vec<Record> = serde_json::from_str(text)?;
    Ok(Dataset::new(records))
}

/// Parse a chunk manifest: a JSON array of chunk file names.
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<String>, ParseError> {
    let text = decode(bytes)?;
    Ok(serde_json::from_str(text)?)
}

fn decode(bytes: &[u8]) -> Result<&str, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}
