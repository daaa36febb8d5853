//! Data models for Rollcall

mod record;
mod submission;

pub use record::{
    local_date_label, AttendanceRecord, AttendanceStats, AttendanceStatus, PAIRING_WINDOW_MS,
};
pub use submission::OfflineSubmission;
