//! Sample-count history.
//!
//! Each publishing run appends how many samples the bacteria (WGS) and
//! metagenome (MGx) datasets held. The history is a CSV with one row per
//! date; a later run on the same date replaces the earlier row.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::TableError;
use crate::parse::parse_records;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub run_id: String,
    pub date: NaiveDate,
    pub wgs_samples: u64,
    pub mgx_samples: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleHistory {
    entries: Vec<HistoryEntry>,
}

impl SampleHistory {
    /// Load the history at `path`. A missing or empty file is an empty
    /// history.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        match File::open(path) {
            Ok(file) => Self::from_reader(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let entries = rdr.deserialize().collect::<Result<Vec<HistoryEntry>, _>>()?;
        let mut history = Self { entries };
        history.normalize();
        Ok(history)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Record a run. Runs where both datasets are empty are skipped and
    /// `false` is returned.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if entry.wgs_samples == 0 && entry.mgx_samples == 0 {
            debug!(date = %entry.date, "no samples counted, history unchanged");
            return false;
        }
        self.entries.push(entry);
        self.normalize();
        true
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for entry in &self.entries {
            wtr.serialize(entry)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Replace the history at `path`. Rows go to a temporary file in the
    /// same directory which is then renamed over the target, so a failed
    /// write leaves the previous history in place.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        self.write_to(&mut tmp)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), entries = self.entries.len(), "saved sample history");
        Ok(())
    }

    /// Sort by date and keep only the last entry recorded for each date.
    fn normalize(&mut self) {
        self.entries.sort_by_key(|e| e.date);
        self.entries.reverse();
        self.entries.dedup_by_key(|e| e.date);
        self.entries.reverse();
    }
}

/// Count the records of a local dataset file (gzip or plain JSON).
///
/// A missing or unreadable file counts as zero samples.
pub fn count_samples(path: &Path) -> u64 {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), "cannot read dataset: {e}");
            return 0;
        }
    };

    let parsed = lrseq_codec::decompress(bytes)
        .map_err(|e| e.to_string())
        .and_then(|raw| parse_records(&raw).map_err(|e| e.to_string()));

    match parsed {
        Ok(dataset) => dataset.len() as u64,
        Err(e) => {
            warn!(path = %path.display(), "cannot count samples: {e}");
            0
        }
    }
}
