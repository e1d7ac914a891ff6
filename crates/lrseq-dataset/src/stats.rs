//! Summary statistics over a dataset view.
//!
//! Box-plot summaries are pre-aggregated here so the rendering layer never
//! has to receive one point per record. Quantiles are positional, not
//! interpolated: for `n` sorted values the median is `v[n / 2]`, Q1 is
//! `v[floor(n * 0.25)]` and Q3 is `v[floor(n * 0.75)]`.

use indexmap::IndexMap;
use serde::Serialize;

use crate::record::{Platform, Record};

/// Number of organisms kept in [`AggregateStats::top_organisms`].
pub const TOP_ORGANISMS: usize = 5;

/// Group label for records without an organism or platform.
pub const UNKNOWN: &str = "unknown";

/// Measured fields that get box-plot summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    ReadCount,
    BaseCount,
}

impl Measure {
    pub const ALL: [Measure; 2] = [Measure::ReadCount, Measure::BaseCount];

    pub fn value(self, record: &Record) -> Option<u64> {
        match self {
            Measure::ReadCount => record.read_count,
            Measure::BaseCount => record.base_count,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measure::ReadCount => "Number of Reads",
            Measure::BaseCount => "Number of Bases",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quartiles {
    pub count: usize,
    pub min: u64,
    pub q1: u64,
    pub median: u64,
    pub q3: u64,
    pub max: u64,
    /// `Q1 - 1.5 * IQR`, never below `min`.
    pub lower_fence: f64,
    /// `Q3 + 1.5 * IQR`, never above `max`.
    pub upper_fence: f64,
}

impl Quartiles {
    /// Summarize `values`. Returns `None` for an empty group.
    pub fn from_values(mut values: Vec<u64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();

        let n = values.len();
        let min = values[0];
        let max = values[n - 1];
        let q1 = values[n / 4];
        let median = values[n / 2];
        let q3 = values[n * 3 / 4];

        let iqr = (q3 - q1) as f64;
        let lower_fence = (q1 as f64 - 1.5 * iqr).max(min as f64);
        let upper_fence = (q3 as f64 + 1.5 * iqr).min(max as f64);

        Some(Self {
            count: n,
            min,
            q1,
            median,
            q3,
            max,
            lower_fence,
            upper_fence,
        })
    }
}

/// Box summary of one measured field for one (platform, organism) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub platform: String,
    pub organism: String,
    #[serde(flatten)]
    pub quartiles: Quartiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganismCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformCount {
    pub platform: Platform,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total: usize,
    /// One entry per [`Platform::TRACKED`] platform, in that order.
    pub platform_counts: Vec<PlatformCount>,
    pub amplicon: usize,
    pub non_amplicon: usize,
    pub top_organisms: Vec<OrganismCount>,
    pub read_count_boxes: Vec<BoxSummary>,
    pub base_count_boxes: Vec<BoxSummary>,
}

#[derive(Default)]
struct Group {
    reads: Vec<u64>,
    bases: Vec<u64>,
}

impl AggregateStats {
    /// Compute the statistics of a view in one pass plus one sort per group.
    ///
    /// Groups and organisms keep first-seen order, so equal counts rank in
    /// the order they were encountered.
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut total = 0;
        let mut tracked = vec![0usize; Platform::TRACKED.len()];
        let mut amplicon = 0;
        let mut organisms: IndexMap<&'a str, usize> = IndexMap::new();
        let mut groups: IndexMap<(&'a str, &'a str), Group> = IndexMap::new();

        for record in records {
            total += 1;

            if let Some(ref platform) = record.instrument_platform
                && let Some(i) = Platform::TRACKED.iter().position(|p| p == platform)
            {
                tracked[i] += 1;
            }

            if record.is_amplicon() {
                amplicon += 1;
            }

            let organism = record.scientific_name.as_deref().unwrap_or(UNKNOWN);
            *organisms.entry(organism).or_default() += 1;

            let platform = record
                .instrument_platform
                .as_ref()
                .map_or(UNKNOWN, Platform::as_str);
            let group = groups.entry((platform, organism)).or_default();
            if let Some(v) = record.read_count {
                group.reads.push(v);
            }
            if let Some(v) = record.base_count {
                group.bases.push(v);
            }
        }

        let mut top_organisms: Vec<OrganismCount> = organisms
            .into_iter()
            .map(|(name, count)| OrganismCount {
                name: name.to_string(),
                count,
            })
            .collect();
        top_organisms.sort_by(|a, b| b.count.cmp(&a.count));
        top_organisms.truncate(TOP_ORGANISMS);

        let mut read_count_boxes = Vec::new();
        let mut base_count_boxes = Vec::new();
        for ((platform, organism), group) in groups {
            let summarize = |values| {
                Quartiles::from_values(values).map(|quartiles| BoxSummary {
                    platform: platform.to_string(),
                    organism: organism.to_string(),
                    quartiles,
                })
            };
            read_count_boxes.extend(summarize(group.reads));
            base_count_boxes.extend(summarize(group.bases));
        }

        Self {
            total,
            platform_counts: Platform::TRACKED
                .iter()
                .zip(tracked)
                .map(|(platform, count)| PlatformCount {
                    platform: platform.clone(),
                    count,
                })
                .collect(),
            amplicon,
            non_amplicon: total - amplicon,
            top_organisms,
            read_count_boxes,
            base_count_boxes,
        }
    }

    pub fn platform_count(&self, platform: &Platform) -> usize {
        self.platform_counts
            .iter()
            .find(|c| &c.platform == platform)
            .map_or(0, |c| c.count)
    }

    pub fn boxes(&self, measure: Measure) -> &[BoxSummary] {
        match measure {
            Measure::ReadCount => &self.read_count_boxes,
            Measure::BaseCount => &self.base_count_boxes,
        }
    }
}
