use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

const MIB: f64 = 1024.0 * 1024.0;

/// A phase of a load. The first five run in order; the last three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[default]
    Downloading,
    Decompressing,
    Parsing,
    Rendering,
    GeneratingPlots,
    Done,
    Error,
    Cancelled,
}

impl Stage {
    /// Progress band `(start, end)` this stage occupies.
    pub const fn band(self) -> (f64, f64) {
        match self {
            Self::Downloading => (0.0, 50.0),
            Self::Decompressing => (50.0, 70.0),
            Self::Parsing => (70.0, 85.0),
            Self::Rendering => (85.0, 92.0),
            Self::GeneratingPlots => (92.0, 100.0),
            Self::Done => (100.0, 100.0),
            Self::Error | Self::Cancelled => (0.0, 100.0),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Downloading => "downloading",
            Self::Decompressing => "decompressing",
            Self::Parsing => "parsing",
            Self::Rendering => "rendering",
            Self::GeneratingPlots => "generating-plots",
            Self::Done => "done",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position in the load order. Terminal failures rank last, so nothing
    /// moves a load out of them.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Downloading => 0,
            Self::Decompressing => 1,
            Self::Parsing => 2,
            Self::Rendering => 3,
            Self::GeneratingPlots => 4,
            Self::Done => 5,
            Self::Error | Self::Cancelled => 6,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancelled)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of load progress as seen by observers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProgressEvent {
    pub percentage: f64,
    pub stage: Stage,
    pub detail: String,
}

/// Receives every progress update of a load, in order.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Raw progress produced while acquiring a dataset, before stage weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageUpdate {
    /// Byte progress of a single-file download.
    Bytes { received: u64, total: Option<u64> },
    /// `done` of `total` units of `stage` finished.
    Step { stage: Stage, done: usize, total: usize },
}

/// Owns the current progress state and fans updates out to observers.
///
/// Within one load neither the stage nor the percentage ever goes back.
/// Updates that would (an earlier stage, or a lower point in the current
/// one) are dropped without notifying anyone. This is what happens when a
/// crashed worker is replaced and the replacement downloads again from zero:
/// observers see nothing until it catches up.
#[derive(Default)]
pub struct ProgressReporter {
    state: ProgressEvent,
    observers: Vec<Arc<dyn ProgressObserver>>,
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl ProgressObserver + 'static) {
        self.observers.push(Arc::new(observer));
    }

    pub fn state(&self) -> &ProgressEvent {
        &self.state
    }

    /// Back to 0% downloading; called at the start of every load.
    pub fn reset(&mut self) {
        self.state = ProgressEvent::default();
        self.emit();
    }

    /// Moves to `fraction` of the way through `stage`'s band.
    pub fn advance(&mut self, stage: Stage, fraction: f64, detail: impl Into<String>) {
        let (start, end) = stage.band();
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let percentage = start + (end - start) * fraction;
        let current = self.state.stage;
        if stage.rank() < current.rank()
            || (stage == current && percentage < self.state.percentage)
        {
            trace!(%stage, %current, percentage, "dropped stale progress");
            return;
        }
        self.state.percentage = percentage.max(self.state.percentage);
        self.state.stage = stage;
        self.state.detail = detail.into();
        self.emit();
    }

    pub fn enter(&mut self, stage: Stage) {
        self.advance(stage, 0.0, String::new());
    }

    /// Byte progress of the download. An unknown total means the body was
    /// buffered whole, so the download band is finished in one step.
    pub fn downloaded(&mut self, received: u64, total: Option<u64>) {
        let received_mb = received as f64 / MIB;
        match total {
            Some(0) => self.advance(Stage::Downloading, 1.0, format!("{received_mb:.1} MB")),
            Some(total) => self.advance(
                Stage::Downloading,
                received as f64 / total as f64,
                format!("{received_mb:.1} / {:.1} MB", total as f64 / MIB),
            ),
            None => self.advance(Stage::Downloading, 1.0, format!("{received_mb:.1} MB")),
        }
    }

    pub fn done(&mut self) {
        self.advance(Stage::Done, 1.0, String::new());
    }

    /// Terminal failure. Percentage stays where the load stopped.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state.stage = Stage::Error;
        self.state.detail = message.into();
        self.emit();
    }

    pub fn cancelled(&mut self) {
        self.state.stage = Stage::Cancelled;
        self.state.detail = "cancelled".into();
        self.emit();
    }

    pub(crate) fn apply(&mut self, update: StageUpdate) {
        match update {
            StageUpdate::Bytes { received, total } => self.downloaded(received, total),
            StageUpdate::Step { stage, done, total } => {
                let fraction = if total == 0 {
                    1.0
                } else {
                    done as f64 / total as f64
                };
                let detail = if total > 1 {
                    format!("{done} / {total} chunks")
                } else {
                    String::new()
                };
                self.advance(stage, fraction, detail);
            }
        }
    }

    fn emit(&self) {
        trace!(
            stage = %self.state.stage,
            percentage = self.state.percentage,
            detail = %self.state.detail,
            "progress"
        );
        for observer in &self.observers {
            observer.on_progress(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use proptest::prelude::*;

    use super::*;

    fn recording() -> (ProgressReporter, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut reporter = ProgressReporter::new();
        reporter.subscribe(move |event: &ProgressEvent| {
            sink.lock().unwrap().push(event.clone());
        });
        (reporter, events)
    }

    #[test]
    fn download_maps_onto_first_half() {
        let (mut reporter, events) = recording();
        reporter.downloaded(0, Some(4 * 1024 * 1024));
        reporter.downloaded(2 * 1024 * 1024, Some(4 * 1024 * 1024));
        reporter.downloaded(4 * 1024 * 1024, Some(4 * 1024 * 1024));

        let events = events.lock().unwrap();
        let percentages: Vec<f64> = events.iter().map(|e| e.percentage).collect();
        assert_eq!(percentages, vec![0.0, 25.0, 50.0]);
        assert_eq!(events[1].detail, "2.0 / 4.0 MB");
    }

    #[test]
    fn unknown_length_jumps_to_fifty() {
        let (mut reporter, events) = recording();
        reporter.downloaded(3 * 1024 * 1024, None);

        let events = events.lock().unwrap();
        assert_eq!(events[0].percentage, 50.0);
        assert_eq!(events[0].stage, Stage::Downloading);
        assert_eq!(events[0].detail, "3.0 MB");
    }

    #[test]
    fn percentage_never_decreases() {
        let (mut reporter, events) = recording();
        reporter.advance(Stage::Parsing, 0.5, "");
        reporter.downloaded(10, Some(100));
        reporter.enter(Stage::Decompressing);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].percentage, 77.5);
        assert_eq!(reporter.state().stage, Stage::Parsing);
    }

    #[test]
    fn restarted_download_stays_quiet_until_it_catches_up() {
        let (mut reporter, events) = recording();
        reporter.downloaded(60, Some(100));
        reporter.enter(Stage::Decompressing);

        // A second attempt starts over from zero.
        reporter.downloaded(0, Some(100));
        reporter.downloaded(80, Some(100));
        assert_eq!(reporter.state().stage, Stage::Decompressing);
        assert_eq!(events.lock().unwrap().len(), 2);

        reporter.enter(Stage::Decompressing);
        reporter.advance(Stage::Decompressing, 0.5, "");
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3].percentage, 60.0);
    }

    #[test]
    fn lower_point_in_the_same_stage_is_dropped() {
        let (mut reporter, events) = recording();
        reporter.downloaded(60, Some(100));
        reporter.downloaded(20, Some(100));
        reporter.downloaded(60, Some(100));

        let events = events.lock().unwrap();
        let details: Vec<&str> = events.iter().map(|e| e.detail.as_str()).collect();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0], details[1]);
    }

    #[test]
    fn reset_starts_over() {
        let (mut reporter, _) = recording();
        reporter.done();
        assert_eq!(reporter.state().percentage, 100.0);
        reporter.reset();
        assert_eq!(reporter.state(), &ProgressEvent::default());
    }

    #[test]
    fn failure_keeps_percentage() {
        let (mut reporter, _) = recording();
        reporter.enter(Stage::Decompressing);
        reporter.fail("bad gzip");
        let state = reporter.state();
        assert_eq!(state.stage, Stage::Error);
        assert_eq!(state.percentage, 50.0);
        assert_eq!(state.detail, "bad gzip");
    }

    #[test]
    fn chunk_steps_describe_progress() {
        let (mut reporter, _) = recording();
        reporter.apply(StageUpdate::Step {
            stage: Stage::Downloading,
            done: 1,
            total: 4,
        });
        assert_eq!(reporter.state().percentage, 12.5);
        assert_eq!(reporter.state().detail, "1 / 4 chunks");
    }

    fn any_stage() -> impl Strategy<Value = Stage> {
        prop_oneof![
            Just(Stage::Downloading),
            Just(Stage::Decompressing),
            Just(Stage::Parsing),
            Just(Stage::Rendering),
            Just(Stage::GeneratingPlots),
        ]
    }

    fn any_update() -> impl Strategy<Value = StageUpdate> {
        prop_oneof![
            (any::<u64>(), proptest::option::of(any::<u64>()))
                .prop_map(|(received, total)| StageUpdate::Bytes { received, total }),
            (any_stage(), 0usize..20, 0usize..20)
                .prop_map(|(stage, done, total)| StageUpdate::Step { stage, done, total }),
        ]
    }

    proptest! {
        #[test]
        fn any_update_sequence_stays_monotonic_and_bounded(
            updates in proptest::collection::vec(any_update(), 0..64)
        ) {
            let (mut reporter, events) = recording();
            for update in updates {
                reporter.apply(update);
            }
            reporter.done();

            let events = events.lock().unwrap();
            for pair in events.windows(2) {
                prop_assert!(pair[0].percentage <= pair[1].percentage);
                prop_assert!(pair[0].stage.rank() <= pair[1].stage.rank());
            }
            prop_assert!(events.iter().all(|e| (0.0..=100.0).contains(&e.percentage)));
            prop_assert_eq!(events.last().map(|e| e.percentage), Some(100.0));
        }
    }
}
