use super::options::FetchPhase;

/// Snapshot of a fetch, passed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Current phase of the fetch.
    pub phase: FetchPhase,

    /// Bytes buffered so far.
    pub bytes_received: u64,

    /// Total expected bytes, if the response declared a length.
    ///
    /// `None` means the body was read in one piece and only the final
    /// [`FetchPhase::Completed`] snapshot is reported.
    pub total_bytes: Option<u64>,
}

impl Progress {
    pub fn new(phase: FetchPhase, bytes_received: u64, total_bytes: Option<u64>) -> Self {
        Self {
            phase,
            bytes_received,
            total_bytes,
        }
    }

    /// Percentage of the body received.
    ///
    /// Returns `None` if the total is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                if self.is_completed() { 100.0 } else { 0.0 }
            } else {
                (self.bytes_received as f64 / total as f64 * 100.0).min(100.0)
            }
        })
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == FetchPhase::Completed
    }
}
