use std::io::Write;

use crate::error::TableError;
use crate::record::Record;

pub const COLUMNS: [&str; 8] = [
    "sample_id",
    "scientific_name",
    "instrument_platform",
    "read_count",
    "base_count",
    "study_accession",
    "source",
    "library_strategy",
];

/// Write records as tab-separated values with a header row.
///
/// Absent attributes are written as empty cells. Returns the number of data
/// rows written.
pub fn write_tsv<'a, W, I>(writer: W, records: I) -> Result<usize, TableError>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);
    out.write_record(COLUMNS)?;

    let mut rows = 0;
    for r in records {
        let read_count = r.read_count.map(|v| v.to_string()).unwrap_or_default();
        let base_count = r.base_count.map(|v| v.to_string()).unwrap_or_default();
        out.write_record([
            r.sample_id.as_deref().unwrap_or_default(),
            r.scientific_name.as_deref().unwrap_or_default(),
            r.instrument_platform.as_ref().map_or("", |p| p.as_str()),
            read_count.as_str(),
            base_count.as_str(),
            r.study_accession.as_deref().unwrap_or_default(),
            r.source.as_deref().unwrap_or_default(),
            r.library_strategy.as_deref().unwrap_or_default(),
        ])?;
        rows += 1;
    }

    out.flush()?;
    Ok(rows)
}
