//! Debounce for scan signals.

use std::time::{Duration, Instant};

/// Default quiet window after an accepted scan
pub const DEFAULT_SCAN_QUIET_WINDOW: Duration = Duration::from_millis(2000);

/// Edge-triggered scan filter: accepts one signal, then ignores everything
/// until the quiet window has elapsed.
#[derive(Debug, Clone)]
pub struct ScanGate {
    quiet_window: Duration,
    last_accepted: Option<Instant>,
}

impl ScanGate {
    pub const fn new(quiet_window: Duration) -> Self {
        Self {
            quiet_window,
            last_accepted: None,
        }
    }

    /// Decide whether a non-empty scan arriving at `now` triggers the pipeline.
    pub fn accept(&mut self, payload: &str, now: Instant) -> bool {
        if payload.is_empty() {
            return false;
        }
        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < self.quiet_window {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }
}

impl Default for ScanGate {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_QUIET_WINDOW)
    }
}
