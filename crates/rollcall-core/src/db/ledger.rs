//! Typed ledger over a key/value store
//!
//! The ledger keeps three independent records: the last used roll number,
//! the FIFO queue of offline submissions, and the attendance history (newest
//! first). Each collection is serialized as a whole JSON array on every
//! mutation. Read-modify-write sequences are not atomic; a single writer is
//! assumed.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::KeyValueStore;
use crate::error::{Error, Result};
use crate::models::{AttendanceRecord, AttendanceStats, AttendanceStatus, OfflineSubmission};

const ROLL_NUMBER_KEY: &str = "@attendance_roll_number";
const OFFLINE_QUEUE_KEY: &str = "@attendance_offline_queue";
const ATTENDANCE_HISTORY_KEY: &str = "@attendance_history";

/// Local ledger service injected into the submission pipeline
pub struct Ledger<S> {
    store: S,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Wrap a store
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub const fn store(&self) -> &S {
        &self.store
    }

    // -- roll number --------------------------------------------------------

    pub fn roll_number(&self) -> Result<Option<String>> {
        self.store.get_item(ROLL_NUMBER_KEY)
    }

    pub fn save_roll_number(&self, roll_number: &str) -> Result<()> {
        self.store.set_item(ROLL_NUMBER_KEY, roll_number)
    }

    pub fn clear_roll_number(&self) -> Result<()> {
        self.store.remove_item(ROLL_NUMBER_KEY)
    }

    // -- offline queue ------------------------------------------------------

    /// All queued submissions, oldest first
    pub fn offline_queue(&self) -> Result<Vec<OfflineSubmission>> {
        self.read_collection(OFFLINE_QUEUE_KEY)
    }

    /// Queue a new submission stamped with the current time
    pub fn enqueue(&self, student_id: &str, token: &str) -> Result<OfflineSubmission> {
        let submission = OfflineSubmission::new(student_id, token);
        self.push_submission(submission.clone())?;
        Ok(submission)
    }

    /// Append an already-built submission to the tail of the queue
    pub fn push_submission(&self, submission: OfflineSubmission) -> Result<()> {
        let mut queue = self.read_for_update(OFFLINE_QUEUE_KEY)?;
        tracing::debug!(id = %submission.id, "Queueing offline submission");
        queue.push(submission);
        self.write_collection(OFFLINE_QUEUE_KEY, &queue)
    }

    /// Drop the submission with `id`. Returns whether anything was removed.
    pub fn remove_submission(&self, id: &str) -> Result<bool> {
        let mut queue: Vec<OfflineSubmission> = self.read_for_update(OFFLINE_QUEUE_KEY)?;
        let before = queue.len();
        queue.retain(|item| item.id != id);
        let removed = queue.len() != before;
        self.write_collection(OFFLINE_QUEUE_KEY, &queue)?;
        Ok(removed)
    }

    pub fn clear_offline_queue(&self) -> Result<()> {
        self.store.remove_item(OFFLINE_QUEUE_KEY)
    }

    // -- history ------------------------------------------------------------

    /// Attendance history, newest first
    pub fn history(&self) -> Result<Vec<AttendanceRecord>> {
        self.read_collection(ATTENDANCE_HISTORY_KEY)
    }

    /// Record a scan attempt stamped with the current time
    pub fn add_record(
        &self,
        student_id: &str,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord> {
        let record = AttendanceRecord::new(student_id, status);
        self.push_record(record.clone())?;
        Ok(record)
    }

    /// Insert an already-built record at the head of the history
    pub fn push_record(&self, record: AttendanceRecord) -> Result<()> {
        let mut history = self.read_for_update(ATTENDANCE_HISTORY_KEY)?;
        history.insert(0, record);
        self.write_collection(ATTENDANCE_HISTORY_KEY, &history)
    }

    /// Flip the first pending record of `student_id` whose timestamp lies
    /// within the pairing window of `timestamp` to present.
    ///
    /// Returns the id of the upgraded record, `None` when nothing matched.
    pub fn upgrade_pending_record(
        &self,
        student_id: &str,
        timestamp: i64,
    ) -> Result<Option<String>> {
        let mut history: Vec<AttendanceRecord> = self.read_for_update(ATTENDANCE_HISTORY_KEY)?;
        let Some(record) = history
            .iter_mut()
            .find(|record| record.pairs_with(student_id, timestamp))
        else {
            return Ok(None);
        };

        record.status = AttendanceStatus::Present;
        let id = record.id.clone();
        self.write_collection(ATTENDANCE_HISTORY_KEY, &history)?;
        Ok(Some(id))
    }

    pub fn stats(&self) -> Result<AttendanceStats> {
        Ok(AttendanceStats::from_history(&self.history()?))
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.store.get_item(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Read a collection about to be rewritten. An unreadable value counts as
    /// empty so the following write replaces it.
    fn read_for_update<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.read_collection(key) {
            Err(Error::Serialization(error)) => {
                tracing::warn!("Discarding unreadable {key}: {error}");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set_item(key, &raw)
    }
}
