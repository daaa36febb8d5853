//! Offline-resilient submission pipeline
//!
//! [`SubmissionSession`] runs one scan through the submission client and
//! records the result; [`Reconciler`] later replays whatever could not reach
//! the server.

mod gate;
mod reconcile;
mod session;

pub use gate::{ScanGate, DEFAULT_SCAN_QUIET_WINDOW};
pub use reconcile::{ReconcileReport, Reconciler};
pub use session::{FailureNotice, SubmissionOutcome, SubmissionSession, SubmissionState};
