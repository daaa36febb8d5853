//! Offline submission model

use serde::{Deserialize, Serialize};

use crate::util::{new_entry_id, unix_millis_now};

/// A submission that could not reach the server and waits for reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSubmission {
    /// Unique identifier
    pub id: String,
    pub student_id: String,
    /// Raw scanned token, normalized again when resubmitted
    pub token: String,
    /// Enqueue timestamp (Unix ms)
    pub timestamp: i64,
}

impl OfflineSubmission {
    #[must_use]
    pub fn new(student_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::at(student_id, token, unix_millis_now())
    }

    #[must_use]
    pub fn at(student_id: impl Into<String>, token: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: new_entry_id(),
            student_id: student_id.into(),
            token: token.into(),
            timestamp,
        }
    }
}
