//! Reconciler tuning.

use std::time::Duration;

/// Default bound on a single entity fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the [`Reconciler`](super::Reconciler).
///
/// # Examples
///
/// ```
/// use atelier::sync::services::ReconcilerConfig;
/// use std::time::Duration;
///
/// let config = ReconcilerConfig::default().with_fetch_timeout(Duration::from_secs(3));
/// assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    fetch_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl ReconcilerConfig {
    /// Sets how long a fetch may take before its event is dropped.
    ///
    /// A zero duration falls back to [`DEFAULT_FETCH_TIMEOUT`].
    #[must_use]
    pub const fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = if fetch_timeout.is_zero() {
            DEFAULT_FETCH_TIMEOUT
        } else {
            fetch_timeout
        };
        self
    }

    /// Returns the fetch timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}
