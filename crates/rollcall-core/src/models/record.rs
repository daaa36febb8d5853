//! Attendance history model

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::{new_entry_id, unix_millis_now};

/// Window (ms) inside which a queued submission and a pending record pair up.
pub const PAIRING_WINDOW_MS: i64 = 5000;

/// Attendance state of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Accepted by the server
    Present,
    /// Waiting in the offline queue
    Pending,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Pending => f.write_str("pending"),
        }
    }
}

/// One user-initiated scan attempt in the history ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Unique identifier
    pub id: String,
    /// Roll number the attempt was made for
    pub student_id: String,
    /// Append timestamp (Unix ms)
    pub timestamp: i64,
    /// Local calendar date of the attempt, for display
    pub date: String,
    /// Current status; only ever moves from pending to present
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Create a record stamped with the current time
    #[must_use]
    pub fn new(student_id: impl Into<String>, status: AttendanceStatus) -> Self {
        Self::at(student_id, status, unix_millis_now())
    }

    /// Create a record with an explicit timestamp
    #[must_use]
    pub fn at(student_id: impl Into<String>, status: AttendanceStatus, timestamp: i64) -> Self {
        Self {
            id: new_entry_id(),
            student_id: student_id.into(),
            timestamp,
            date: local_date_label(timestamp),
            status,
        }
    }

    /// Whether this record is the pending counterpart of a queued submission
    /// made by `student_id` at `timestamp`.
    pub fn pairs_with(&self, student_id: &str, timestamp: i64) -> bool {
        self.status == AttendanceStatus::Pending
            && self.student_id == student_id
            && (self.timestamp - timestamp).abs() < PAIRING_WINDOW_MS
    }
}

/// Aggregate view over the history ledger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_records: usize,
    pub present_count: usize,
    pub pending_count: usize,
    /// Percentage of records that are present, 0 for an empty history
    pub attendance_rate: f64,
}

impl AttendanceStats {
    /// Compute stats from a history slice
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_history(history: &[AttendanceRecord]) -> Self {
        let present_count = history
            .iter()
            .filter(|record| record.status == AttendanceStatus::Present)
            .count();
        let pending_count = history
            .iter()
            .filter(|record| record.status == AttendanceStatus::Pending)
            .count();
        let total_records = history.len();
        let attendance_rate = if total_records > 0 {
            present_count as f64 / total_records as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_records,
            present_count,
            pending_count,
            attendance_rate,
        }
    }
}

/// Render a Unix ms timestamp as a `M/D/YYYY` date in the local timezone.
pub fn local_date_label(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|time| time.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}
