use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Args;
use lrseq_dataset::history::{HistoryEntry, SampleHistory, count_samples};
use tracing::{info, warn};

use crate::ui::table::{Formatter, HistoryRow};

#[derive(Debug, Clone, Args)]
pub struct HistoryArg {
    /// History CSV, created if missing.
    #[arg(long, value_name = "FILE")]
    pub csv: PathBuf,

    /// Bacteria (WGS) dataset, gzip compressed or plain JSON.
    #[arg(long, value_name = "FILE")]
    pub wgs: PathBuf,

    /// Metagenome (MGx) dataset, gzip compressed or plain JSON.
    #[arg(long, value_name = "FILE")]
    pub mgx: PathBuf,

    #[arg(long, default_value = "")]
    pub run_id: String,

    /// Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl HistoryArg {
    pub fn run(&self) -> anyhow::Result<()> {
        let mut history = SampleHistory::load(&self.csv)
            .with_context(|| format!("failed to read {}", self.csv.display()))?;

        let entry = HistoryEntry {
            run_id: self.run_id.clone(),
            date: self.date.unwrap_or_else(|| Local::now().date_naive()),
            wgs_samples: count_samples(&self.wgs),
            mgx_samples: count_samples(&self.mgx),
        };
        info!(
            date = %entry.date,
            wgs = entry.wgs_samples,
            mgx = entry.mgx_samples,
            "counted samples"
        );

        if !history.record(entry) {
            warn!("no samples counted, history left unchanged");
            return Ok(());
        }
        history
            .save(&self.csv)
            .with_context(|| format!("failed to write {}", self.csv.display()))?;

        let table = Formatter {
            header: Some(format!("sample history ({})", self.csv.display())),
            ..Default::default()
        }
        .build(history.entries().iter().map(HistoryRow::from));
        println!("{table}");
        Ok(())
    }
}
