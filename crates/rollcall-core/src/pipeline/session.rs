//! Scan-to-submit orchestration.

use std::time::Instant;

use chrono::{DateTime, Local};

use super::gate::ScanGate;
use crate::client::{AttendanceTransport, SubmissionClient};
use crate::db::{KeyValueStore, Ledger};
use crate::models::AttendanceStatus;

const GENERIC_FAILURE: &str = "Attendance submission failed";
const RETRY_SUGGESTION: &str = "Please try again";
const QUEUED_SUGGESTION: &str =
    "Your attendance has been saved and will be submitted when you're back online.";

/// Where the session is in its per-scan state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success,
    LogicalFailure,
    TransportFailure,
}

/// Message shown on the failure surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    pub message: String,
    pub suggestion: String,
}

/// What the caller should present after a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The server accepted the attendance mark
    Success {
        student_name: String,
        captured_at: DateTime<Local>,
    },
    /// The server answered and rejected it; nothing was stored
    Rejected(FailureNotice),
    /// The server could not be reached; the attempt was queued
    Queued(FailureNotice),
}

/// Per-screen state for the scan-to-submit flow.
///
/// Holds the scanned token and the roll number being typed, and runs one
/// submission at a time against the injected ledger and client.
pub struct SubmissionSession<'a, S, T> {
    ledger: &'a Ledger<S>,
    client: &'a SubmissionClient<T>,
    gate: ScanGate,
    token: Option<String>,
    roll_number: String,
    state: SubmissionState,
}

impl<'a, S: KeyValueStore, T: AttendanceTransport> SubmissionSession<'a, S, T> {
    pub const fn new(
        ledger: &'a Ledger<S>,
        client: &'a SubmissionClient<T>,
        gate: ScanGate,
    ) -> Self {
        Self {
            ledger,
            client,
            gate,
            token: None,
            roll_number: String::new(),
            state: SubmissionState::Idle,
        }
    }

    /// Prefill the roll number from the ledger, if one was saved.
    pub fn load_saved_roll_number(&mut self) {
        match self.ledger.roll_number() {
            Ok(Some(saved)) => self.roll_number = saved,
            Ok(None) => {}
            Err(error) => tracing::warn!("Failed to load saved roll number: {error}"),
        }
    }

    pub fn roll_number(&self) -> &str {
        &self.roll_number
    }

    pub fn set_roll_number(&mut self, roll_number: impl Into<String>) {
        self.roll_number = roll_number.into();
    }

    pub fn held_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub const fn state(&self) -> SubmissionState {
        self.state
    }

    /// Feed a raw scan signal. Returns `true` when the scan was accepted and
    /// its payload is now the held token.
    pub fn on_scan(&mut self, payload: &str, now: Instant) -> bool {
        if !self.gate.accept(payload, now) {
            return false;
        }
        self.token = Some(payload.to_string());
        true
    }

    /// Submit the held token for the current roll number.
    ///
    /// Returns `None` without doing anything when either is missing.
    pub async fn submit(&mut self) -> Option<SubmissionOutcome> {
        let student_id = self.roll_number.trim().to_string();
        let token = match self.token.as_deref() {
            Some(token) if !token.is_empty() && !student_id.is_empty() => token.trim().to_string(),
            _ => {
                self.state = SubmissionState::Idle;
                return None;
            }
        };

        self.state = SubmissionState::Submitting;

        let outcome = match self.client.submit(&student_id, &token).await {
            Ok(result) if result.success => {
                self.state = SubmissionState::Success;
                self.persist_success(&student_id);
                self.token = None;
                SubmissionOutcome::Success {
                    student_name: result.student_name.unwrap_or_else(|| self.roll_number.clone()),
                    captured_at: Local::now(),
                }
            }
            Ok(result) => {
                self.state = SubmissionState::LogicalFailure;
                SubmissionOutcome::Rejected(FailureNotice {
                    message: result.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
                    suggestion: RETRY_SUGGESTION.to_string(),
                })
            }
            Err(error) => {
                self.state = SubmissionState::TransportFailure;
                tracing::warn!("Submission for {student_id} queued for later: {error}");
                self.persist_offline(&student_id, &token);
                self.token = None;
                SubmissionOutcome::Queued(FailureNotice {
                    message: error.to_string(),
                    suggestion: QUEUED_SUGGESTION.to_string(),
                })
            }
        };

        Some(outcome)
    }

    fn persist_success(&self, student_id: &str) {
        if let Err(error) = self.ledger.save_roll_number(student_id) {
            tracing::warn!("Failed to save roll number: {error}");
        }
        if let Err(error) = self.ledger.add_record(student_id, AttendanceStatus::Present) {
            tracing::warn!("Failed to record attendance: {error}");
        }
    }

    fn persist_offline(&self, student_id: &str, token: &str) {
        if let Err(error) = self.ledger.enqueue(student_id, token) {
            tracing::warn!("Failed to queue offline submission: {error}");
        }
        if let Err(error) = self.ledger.add_record(student_id, AttendanceStatus::Pending) {
            tracing::warn!("Failed to record pending attendance: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::testing::ScriptedTransport;
    use crate::db::testing::FailingStore;
    use crate::db::MemoryStore;
    use crate::models::PAIRING_WINDOW_MS;
    use pretty_assertions::assert_eq;

    fn scanned<'a>(
        ledger: &'a Ledger<MemoryStore>,
        client: &'a SubmissionClient<ScriptedTransport>,
    ) -> SubmissionSession<'a, MemoryStore, ScriptedTransport> {
        let mut session = SubmissionSession::new(ledger, client, ScanGate::default());
        session.set_roll_number(" 21CS042 ");
        assert!(session.on_scan("https://x/y?token=12345", Instant::now()));
        session
    }

    #[tokio::test]
    async fn test_success_path() {
        let ledger = Ledger::new(MemoryStore::new());
        let client = SubmissionClient::new(ScriptedTransport::new().reply(200, "Welcome John"));
        let mut session = scanned(&ledger, &client);

        let outcome = session.submit().await.unwrap();

        let SubmissionOutcome::Success { student_name, .. } = &outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(student_name, "21CS042");
        assert_eq!(session.state(), SubmissionState::Success);
        assert_eq!(session.held_token(), None);
        assert_eq!(ledger.roll_number().unwrap().as_deref(), Some("21CS042"));
        assert_eq!(
            ledger.history().unwrap()[0].status,
            AttendanceStatus::Present
        );
        assert!(ledger.offline_queue().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logical_failure_touches_nothing() {
        let ledger = Ledger::new(MemoryStore::new());
        let client = SubmissionClient::new(ScriptedTransport::new().reply(200, "Invalid"));
        let mut session = scanned(&ledger, &client);

        let outcome = session.submit().await.unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::Rejected(FailureNotice {
                message: "Invalid token or student ID".to_string(),
                suggestion: RETRY_SUGGESTION.to_string(),
            })
        );
        assert_eq!(session.state(), SubmissionState::LogicalFailure);
        assert_eq!(session.held_token(), Some("https://x/y?token=12345"));
        assert_eq!(ledger.roll_number().unwrap(), None);
        assert!(ledger.history().unwrap().is_empty());
        assert!(ledger.offline_queue().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_queues_and_records_pending() {
        let ledger = Ledger::new(MemoryStore::new());
        let client = SubmissionClient::new(ScriptedTransport::new().fail());
        let mut session = scanned(&ledger, &client);

        let outcome = session.submit().await.unwrap();

        let SubmissionOutcome::Queued(notice) = &outcome else {
            panic!("expected queued, got {outcome:?}");
        };
        assert!(notice.message.contains("Network error"));
        assert_eq!(notice.suggestion, QUEUED_SUGGESTION);
        assert_eq!(session.state(), SubmissionState::TransportFailure);
        assert_eq!(session.held_token(), None);

        let queue = ledger.offline_queue().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].student_id, "21CS042");
        assert_eq!(queue[0].token, "https://x/y?token=12345");

        let head = &ledger.history().unwrap()[0];
        assert_eq!(head.status, AttendanceStatus::Pending);
        assert_eq!(head.student_id, "21CS042");
        assert!((head.timestamp - queue[0].timestamp).abs() < PAIRING_WINDOW_MS);
        assert_eq!(ledger.roll_number().unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_input_is_a_noop() {
        let ledger = Ledger::new(MemoryStore::new());
        let client = SubmissionClient::new(ScriptedTransport::new().reply(200, "Welcome"));

        let mut session = SubmissionSession::new(&ledger, &client, ScanGate::default());
        session.set_roll_number("21CS042");
        assert_eq!(session.submit().await, None);

        session.set_roll_number("   ");
        assert!(session.on_scan("12345", Instant::now()));
        assert_eq!(session.submit().await, None);

        assert_eq!(session.state(), SubmissionState::Idle);
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_next_submission_needs_fresh_scan() {
        let ledger = Ledger::new(MemoryStore::new());
        let client = SubmissionClient::new(ScriptedTransport::new().reply(200, "Present"));
        let mut session = scanned(&ledger, &client);

        assert!(session.submit().await.is_some());
        assert_eq!(session.submit().await, None);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[test]
    fn test_load_saved_roll_number() {
        let ledger = Ledger::new(MemoryStore::new());
        let client = SubmissionClient::new(ScriptedTransport::new());
        ledger.save_roll_number("99").unwrap();

        let mut session = SubmissionSession::new(&ledger, &client, ScanGate::default());
        session.load_saved_roll_number();
        assert_eq!(session.roll_number(), "99");
    }

    #[tokio::test]
    async fn test_transport_failure_repairs_unreadable_queue() {
        let ledger = Ledger::new(MemoryStore::new());
        ledger
            .store()
            .set_item("@attendance_offline_queue", "not json")
            .unwrap();
        let client = SubmissionClient::new(ScriptedTransport::new().fail());
        let mut session = scanned(&ledger, &client);

        let outcome = session.submit().await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Queued(_)));

        let queue = ledger.offline_queue().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].student_id, "21CS042");

        let head = &ledger.history().unwrap()[0];
        assert!(head.pairs_with(&queue[0].student_id, queue[0].timestamp));
    }

    #[tokio::test]
    async fn test_storage_failures_do_not_block_outcome() {
        let ledger = Ledger::new(FailingStore);
        let client = SubmissionClient::new(ScriptedTransport::new().reply(200, "Welcome").fail());

        let mut session = SubmissionSession::new(&ledger, &client, ScanGate::default());
        session.load_saved_roll_number();
        assert_eq!(session.roll_number(), "");

        session.set_roll_number("21CS042");
        let start = Instant::now();
        assert!(session.on_scan("12345", start));
        assert!(matches!(
            session.submit().await,
            Some(SubmissionOutcome::Success { .. })
        ));

        assert!(session.on_scan("67890", start + Duration::from_secs(3)));
        assert!(matches!(
            session.submit().await,
            Some(SubmissionOutcome::Queued(_))
        ));
        assert_eq!(session.state(), SubmissionState::TransportFailure);
    }
}
