//! Offline queue reconciliation.

use serde::Serialize;

use crate::client::{AttendanceTransport, SubmissionClient};
use crate::db::{KeyValueStore, Ledger};
use crate::models::OfflineSubmission;

/// Counts from one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileReport {
    pub processed: usize,
    pub failed: usize,
}

/// Drains the offline queue through the submission client.
pub struct Reconciler<'a, S, T> {
    ledger: &'a Ledger<S>,
    client: &'a SubmissionClient<T>,
}

impl<'a, S: KeyValueStore, T: AttendanceTransport> Reconciler<'a, S, T> {
    pub const fn new(ledger: &'a Ledger<S>, client: &'a SubmissionClient<T>) -> Self {
        Self { ledger, client }
    }

    /// Retry every submission queued at call time, one after another.
    ///
    /// Accepted submissions leave the queue and upgrade their paired pending
    /// record; rejected and unreachable ones stay queued for the next pass.
    pub async fn reconcile(&self) -> ReconcileReport {
        let queue = match self.ledger.offline_queue() {
            Ok(queue) => queue,
            Err(error) => {
                tracing::warn!("Failed to read offline queue: {error}");
                return ReconcileReport::default();
            }
        };

        let mut report = ReconcileReport::default();
        if queue.is_empty() {
            return report;
        }

        for submission in &queue {
            match self
                .client
                .submit(&submission.student_id, &submission.token)
                .await
            {
                Ok(result) if result.success => {
                    self.settle(submission);
                    report.processed += 1;
                }
                Ok(_) => {
                    tracing::debug!(id = %submission.id, "Queued submission rejected, keeping it");
                    report.failed += 1;
                }
                Err(error) => {
                    tracing::debug!(
                        id = %submission.id,
                        "Queued submission still offline: {error}"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            failed = report.failed,
            "Offline queue reconciled"
        );
        report
    }

    fn settle(&self, submission: &OfflineSubmission) {
        if let Err(error) = self.ledger.remove_submission(&submission.id) {
            tracing::warn!("Failed to dequeue submission {}: {error}", submission.id);
        }
        match self
            .ledger
            .upgrade_pending_record(&submission.student_id, submission.timestamp)
        {
            Ok(Some(record_id)) => {
                tracing::debug!(record = %record_id, "Pending record marked present");
            }
            Ok(None) => {}
            Err(error) => tracing::warn!("Failed to upgrade pending record: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::client::testing::ScriptedTransport;
    use crate::client::{ScanForm, ScanResponse, TransportError};
    use crate::db::testing::FailingStore;
    use crate::db::MemoryStore;
    use crate::models::{AttendanceRecord, AttendanceStatus};
    use pretty_assertions::assert_eq;

    fn queued(
        ledger: &Ledger<MemoryStore>,
        student_id: &str,
        token: &str,
        at: i64,
    ) -> OfflineSubmission {
        let submission = OfflineSubmission::at(student_id, token, at);
        ledger.push_submission(submission.clone()).unwrap();
        submission
    }

    fn pending(ledger: &Ledger<MemoryStore>, student_id: &str, at: i64) -> AttendanceRecord {
        let record = AttendanceRecord::at(student_id, AttendanceStatus::Pending, at);
        ledger.push_record(record.clone()).unwrap();
        record
    }

    #[tokio::test]
    async fn test_upgrades_matching_record() {
        let ledger = Ledger::new(MemoryStore::new());
        queued(&ledger, "42", "token=1", 1_000_000);
        let record = pending(&ledger, "42", 1_000_050);

        let client = SubmissionClient::new(ScriptedTransport::new().reply(200, "Welcome"));
        let report = Reconciler::new(&ledger, &client).reconcile().await;

        assert_eq!(report, ReconcileReport { processed: 1, failed: 0 });
        assert!(ledger.offline_queue().unwrap().is_empty());

        let history = ledger.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, record.id);
        assert_eq!(history[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_dequeues_without_match() {
        let ledger = Ledger::new(MemoryStore::new());
        queued(&ledger, "42", "token=1", 1_000_000);
        let far = pending(&ledger, "42", 1_000_000 + 60_000);
        let other = pending(&ledger, "7", 1_000_000);

        let client = SubmissionClient::new(ScriptedTransport::new().reply(200, "Present"));
        let report = Reconciler::new(&ledger, &client).reconcile().await;

        assert_eq!(report, ReconcileReport { processed: 1, failed: 0 });
        assert!(ledger.offline_queue().unwrap().is_empty());
        assert_eq!(ledger.history().unwrap(), vec![other, far]);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_rejected_entry() {
        let ledger = Ledger::new(MemoryStore::new());
        let first = queued(&ledger, "1", "111", 1_000);
        let second = queued(&ledger, "2", "222", 2_000);

        let transport = ScriptedTransport::new()
            .reply(200, "Invalid")
            .reply(200, "Welcome");
        let client = SubmissionClient::new(transport);
        let report = Reconciler::new(&ledger, &client).reconcile().await;

        assert_eq!(report, ReconcileReport { processed: 1, failed: 1 });
        assert_eq!(ledger.offline_queue().unwrap(), vec![first]);

        let tokens: Vec<_> = client
            .transport()
            .calls()
            .into_iter()
            .map(|form| form.token)
            .collect();
        assert_eq!(tokens, vec!["111".to_string(), second.token]);
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_abort_pass() {
        let ledger = Ledger::new(MemoryStore::new());
        let first = queued(&ledger, "1", "111", 1_000);
        queued(&ledger, "2", "222", 2_000);
        let third = queued(&ledger, "3", "333", 3_000);

        let transport = ScriptedTransport::new()
            .fail()
            .reply(200, "Welcome")
            .reply(503, "Present");
        let client = SubmissionClient::new(transport);
        let report = Reconciler::new(&ledger, &client).reconcile().await;

        assert_eq!(report, ReconcileReport { processed: 1, failed: 2 });
        assert_eq!(ledger.offline_queue().unwrap(), vec![first, third]);
    }

    #[tokio::test]
    async fn test_empty_queue_makes_no_requests() {
        let ledger = Ledger::new(MemoryStore::new());
        let client = SubmissionClient::new(ScriptedTransport::new());

        let report = Reconciler::new(&ledger, &client).reconcile().await;

        assert_eq!(report, ReconcileReport::default());
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_entries_are_retried_next_pass() {
        let ledger = Ledger::new(MemoryStore::new());
        queued(&ledger, "1", "111", 1_000);

        let transport = ScriptedTransport::new()
            .reply(200, "Invalid")
            .reply(200, "Invalid");
        let client = SubmissionClient::new(transport);
        let reconciler = Reconciler::new(&ledger, &client);

        assert_eq!(reconciler.reconcile().await.failed, 1);
        assert_eq!(reconciler.reconcile().await.failed, 1);
        assert_eq!(ledger.offline_queue().unwrap().len(), 1);
        assert_eq!(client.transport().calls().len(), 2);
    }

    /// Accepts every scan and queues a new one while the request is in flight
    struct EnqueuingTransport<'a> {
        ledger: &'a Ledger<MemoryStore>,
        calls: Mutex<Vec<ScanForm>>,
    }

    impl AttendanceTransport for EnqueuingTransport<'_> {
        async fn post_scan(&self, form: &ScanForm) -> Result<ScanResponse, TransportError> {
            self.calls.lock().unwrap().push(form.clone());
            self.ledger.enqueue("late", "999").unwrap();
            Ok(ScanResponse::new(200, "Welcome"))
        }
    }

    #[tokio::test]
    async fn test_entries_queued_mid_pass_wait_for_next_pass() {
        let ledger = Ledger::new(MemoryStore::new());
        queued(&ledger, "1", "111", 1_000);
        queued(&ledger, "2", "222", 2_000);

        let client = SubmissionClient::new(EnqueuingTransport {
            ledger: &ledger,
            calls: Mutex::new(Vec::new()),
        });
        let report = Reconciler::new(&ledger, &client).reconcile().await;

        assert_eq!(report, ReconcileReport { processed: 2, failed: 0 });

        let tokens: Vec<_> = client
            .transport()
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|form| form.token.clone())
            .collect();
        assert_eq!(tokens, vec!["111".to_string(), "222".to_string()]);

        let queue = ledger.offline_queue().unwrap();
        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|submission| submission.student_id == "late"));
    }

    #[tokio::test]
    async fn test_unreadable_queue_yields_empty_pass() {
        let ledger = Ledger::new(FailingStore);
        let client = SubmissionClient::new(ScriptedTransport::new().reply(200, "Welcome"));

        let report = Reconciler::new(&ledger, &client).reconcile().await;

        assert_eq!(report, ReconcileReport::default());
        assert!(client.transport().calls().is_empty());
    }
}
