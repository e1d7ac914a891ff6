use std::fmt;
use std::sync::Arc;

use super::progress::Progress;

/// Phases of a fetch.
///
/// Fetches move through these phases in order:
/// Connecting → Downloading → Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Request sent, waiting for response headers.
    #[default]
    Connecting,

    /// Streaming body chunks into the buffer.
    ///
    /// Only reported when the response declares its length.
    Downloading,

    /// The whole body is buffered.
    Completed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Connecting => write!(f, "Connecting"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Configuration for a [`Fetcher`](crate::Fetcher).
///
/// # Examples
///
/// ```
/// use lrseq_fetch::FetchOptions;
/// use std::sync::Arc;
///
/// let options = FetchOptions::default()
///     .header("Accept", "application/json")
///     .on_progress(Arc::new(|progress| {
///         if let Some(pct) = progress.percentage() {
///             println!("{pct:.1}%");
///         }
///     }));
/// ```
#[derive(Clone, Default)]
pub struct FetchOptions {
    /// Extra request headers, sent with every request.
    pub headers: Arc<[(String, String)]>,

    /// Invoked on phase transitions and after every streamed chunk.
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("headers", &self.headers)
            .field("on_progress", &"{ ... }")
            .finish()
    }
}

impl FetchOptions {
    /// Add a single request header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_accumulate_in_order() {
        let options = FetchOptions::default().header("A", "1").header("B", "2");
        assert_eq!(
            &*options.headers,
            &[
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn phase_display() {
        assert_eq!(FetchPhase::Downloading.to_string(), "Downloading");
        assert_eq!(FetchPhase::default(), FetchPhase::Connecting);
    }
}
