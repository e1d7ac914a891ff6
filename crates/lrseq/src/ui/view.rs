use lrseq_dataset::{AggregateStats, Dataset, Measure, Record, SampleFilter};
use lrseq_loader::RenderTarget;

use crate::ui::table::{Formatter, box_table, organism_rows, summary_rows};

/// Render target that keeps the filtered view and prints it as tables.
#[derive(Debug, Default)]
pub struct TerminalView {
    filter: SampleFilter,
    loaded: usize,
    view: Dataset,
    stats: AggregateStats,
}

impl TerminalView {
    pub fn new(filter: SampleFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn records(&self) -> &[Record] {
        self.view.records()
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn print(&self) {
        let footer = (!self.filter.is_empty())
            .then(|| format!("{} of {} samples match the filter", self.view.len(), self.loaded));
        let summary = Formatter {
            header: Some("summary".into()),
            footer,
            ..Default::default()
        }
        .build(summary_rows(&self.stats));
        println!("{summary}\n");

        if !self.stats.top_organisms.is_empty() {
            let organisms = Formatter {
                header: Some("top organisms".into()),
                ..Default::default()
            }
            .build(organism_rows(&self.stats.top_organisms));
            println!("{organisms}\n");
        }

        for measure in Measure::ALL {
            if !self.stats.boxes(measure).is_empty() {
                println!("{}\n", box_table(&self.stats, measure));
            }
        }
    }
}

impl RenderTarget for TerminalView {
    fn render(&mut self, dataset: &Dataset) {
        self.loaded = dataset.len();
        self.view = self.filter.apply(dataset).cloned().collect::<Vec<_>>().into();
    }

    /// Statistics always describe the filtered view.
    fn plots(&mut self, stats: &AggregateStats) {
        self.stats = if self.filter.is_empty() {
            stats.clone()
        } else {
            AggregateStats::compute(&self.view)
        };
    }
}

#[cfg(test)]
mod tests {
    use lrseq_dataset::{Platform, StrategyFilter};

    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Record {
                sample_id: Some("S1".into()),
                instrument_platform: Some(Platform::OxfordNanopore),
                library_strategy: Some("WGS".into()),
                ..Default::default()
            },
            Record {
                sample_id: Some("S2".into()),
                instrument_platform: Some(Platform::PacBioSmrt),
                library_strategy: Some("AMPLICON".into()),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn filtered_view_gets_its_own_stats() {
        let data = dataset();
        let mut view = TerminalView::new(
            SampleFilter::default().library_strategy(StrategyFilter::IsNot("amplicon".into())),
        );

        view.render(&data);
        view.plots(&AggregateStats::compute(&data));

        assert_eq!(view.records().len(), 1);
        assert_eq!(view.stats().total, 1);
        assert_eq!(view.stats().amplicon, 0);
        assert_eq!(view.stats().platform_count(&Platform::PacBioSmrt), 0);
    }

    #[test]
    fn unfiltered_view_reuses_pipeline_stats() {
        let data = dataset();
        let stats = AggregateStats::compute(&data);
        let mut view = TerminalView::new(SampleFilter::default());

        view.render(&data);
        view.plots(&stats);

        assert_eq!(view.records().len(), 2);
        assert_eq!(view.stats(), &stats);
    }
}
