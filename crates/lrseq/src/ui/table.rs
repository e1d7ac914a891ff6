use lrseq_dataset::history::HistoryEntry;
use lrseq_dataset::{AggregateStats, BoxSummary, Measure, OrganismCount};
use tabled::{
    Table, Tabled,
    settings::{Panel, Style},
};

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl Formatter {
    pub fn build<T: Tabled, I: IntoIterator<Item = T>>(self, data: I) -> Table {
        let mut table = Table::new(data);
        if let Some(header) = self.header {
            table.with(Panel::header(header));
        }
        if let Some(footer) = self.footer {
            table.with(Panel::footer(footer));
        }

        table.with(Style::blank());
        table
    }
}

#[derive(Tabled)]
pub struct CountRow {
    pub metric: String,
    pub samples: usize,
}

#[derive(Tabled)]
pub struct OrganismRow {
    pub rank: usize,
    pub organism: String,
    pub samples: usize,
}

#[derive(Tabled)]
pub struct BoxRow {
    pub platform: String,
    pub organism: String,
    pub n: usize,
    pub min: u64,
    #[tabled(rename = "lower fence")]
    pub lower_fence: String,
    pub q1: u64,
    pub median: u64,
    pub q3: u64,
    #[tabled(rename = "upper fence")]
    pub upper_fence: String,
    pub max: u64,
}

#[derive(Tabled)]
pub struct HistoryRow {
    pub date: String,
    pub run: String,
    pub wgs: u64,
    pub mgx: u64,
}

impl From<&BoxSummary> for BoxRow {
    fn from(summary: &BoxSummary) -> Self {
        let q = &summary.quartiles;
        Self {
            platform: summary.platform.clone(),
            organism: summary.organism.clone(),
            n: q.count,
            min: q.min,
            lower_fence: format!("{:.1}", q.lower_fence),
            q1: q.q1,
            median: q.median,
            q3: q.q3,
            upper_fence: format!("{:.1}", q.upper_fence),
            max: q.max,
        }
    }
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            date: entry.date.to_string(),
            run: entry.run_id.clone(),
            wgs: entry.wgs_samples,
            mgx: entry.mgx_samples,
        }
    }
}

pub fn summary_rows(stats: &AggregateStats) -> Vec<CountRow> {
    let mut rows = vec![CountRow {
        metric: "total".into(),
        samples: stats.total,
    }];
    rows.extend(stats.platform_counts.iter().map(|pc| CountRow {
        metric: pc.platform.label().to_string(),
        samples: pc.count,
    }));
    rows.push(CountRow {
        metric: "amplicon".into(),
        samples: stats.amplicon,
    });
    rows.push(CountRow {
        metric: "non-amplicon".into(),
        samples: stats.non_amplicon,
    });
    rows
}

pub fn organism_rows(top: &[OrganismCount]) -> Vec<OrganismRow> {
    top.iter()
        .enumerate()
        .map(|(i, oc)| OrganismRow {
            rank: i + 1,
            organism: oc.name.clone(),
            samples: oc.count,
        })
        .collect()
}

pub fn box_table(stats: &AggregateStats, measure: Measure) -> Table {
    Formatter {
        header: Some(measure.label().to_string()),
        ..Default::default()
    }
    .build(stats.boxes(measure).iter().map(BoxRow::from))
}
