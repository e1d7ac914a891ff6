use indicatif::{ProgressBar, ProgressStyle};
use lrseq_loader::{ProgressEvent, ProgressObserver, Stage};
use once_cell::sync::Lazy;

const PB_STYLE: &str =
    "{spinner:.blue} {prefix:>16.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos:>3}% {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Terminal progress bar driven by load progress events. Cloning shares the
/// same bar.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    pb: ProgressBar,
    finish: Option<String>,
}

impl ProgressObserver for ProgressTracker {
    fn on_progress(&self, event: &ProgressEvent) {
        self.pb.set_prefix(event.stage.as_str());
        self.pb.set_position(bar_position(event.percentage));
        match event.stage {
            Stage::Error => self.pb.set_message(format!("error: {}", event.detail)),
            _ => self.pb.set_message(event.detail.clone()),
        }
    }
}

impl ProgressTracker {
    /// Leaves the bar on screen; a failed load keeps its last state.
    pub fn finish(self, success: bool) {
        if !success {
            self.pb.abandon();
            return;
        }
        match self.finish {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }
}

fn bar_position(percentage: f64) -> u64 {
    percentage.round().clamp(0.0, 100.0) as u64
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTrackerBuilder {
    prefix: Option<String>,
    finish: Option<String>,
}

impl ProgressTrackerBuilder {
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_finish(mut self, finish: &str) -> Self {
        self.finish = Some(finish.to_string());
        self
    }

    pub fn build(self) -> ProgressTracker {
        let pb = ProgressBar::new(100);
        let pb = if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.with_style(style.clone())
        } else {
            pb
        };

        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }
        ProgressTracker {
            pb,
            finish: self.finish,
        }
    }
}
