use std::env;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use rollcall_core::client::HttpTransport;
use rollcall_core::config::{default_db_path, ClientConfig};
use rollcall_core::pipeline::{ReconcileReport, SubmissionOutcome};
use rollcall_core::util::{normalize_text_option, unix_millis_now};
use rollcall_core::{
    AttendanceRecord, AttendanceStats, Ledger, OfflineSubmission, Reconciler, SqliteStore,
    SubmissionClient, SubmissionSession,
};
use serde::Serialize;

use crate::error::CliError;

pub type CliLedger = Ledger<SqliteStore>;
pub type CliClient = SubmissionClient<HttpTransport>;
pub type CliSession<'a> = SubmissionSession<'a, SqliteStore, HttpTransport>;

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: String,
    pub student_id: String,
    pub status: String,
    pub date: String,
    pub time: String,
    pub timestamp: i64,
    pub relative_time: String,
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("ROLLCALL_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn open_ledger(path: &Path) -> Result<CliLedger, CliError> {
    let store = SqliteStore::open(path)?;
    tracing::debug!("Opened ledger at {}", path.display());
    Ok(Ledger::new(store))
}

pub fn build_client(config: &ClientConfig) -> Result<CliClient, CliError> {
    let transport = HttpTransport::new(config.server_url(), config.request_timeout())?;
    tracing::debug!("Submitting to {}", transport.endpoint());
    Ok(SubmissionClient::new(transport))
}

/// Use the explicit roll number, else the saved one.
pub fn apply_roll_number(
    session: &mut CliSession<'_>,
    explicit: Option<String>,
) -> Result<(), CliError> {
    match explicit {
        Some(explicit) => {
            let roll_number =
                normalize_text_option(Some(explicit)).ok_or(CliError::EmptyRollNumber)?;
            session.set_roll_number(roll_number);
        }
        None => session.load_saved_roll_number(),
    }

    if session.roll_number().trim().is_empty() {
        return Err(CliError::MissingRollNumber);
    }
    Ok(())
}

/// Replay the offline queue and print a one-line summary when anything was
/// attempted.
pub async fn reconcile_quietly(ledger: &CliLedger, client: &CliClient) -> ReconcileReport {
    let report = Reconciler::new(ledger, client).reconcile().await;
    if let Some(line) = format_reconcile_summary(report) {
        println!("{line}");
    }
    report
}

pub fn format_reconcile_summary(report: ReconcileReport) -> Option<String> {
    if report.processed == 0 && report.failed == 0 {
        return None;
    }
    Some(format!(
        "Offline queue: {} submitted, {} still pending",
        report.processed, report.failed
    ))
}

pub fn format_outcome_lines(outcome: &SubmissionOutcome) -> Vec<String> {
    match outcome {
        SubmissionOutcome::Success {
            student_name,
            captured_at,
        } => vec![
            "Attendance marked".to_string(),
            format!("  Student: {student_name}"),
            format!("  Time:    {}", captured_at.format("%-I:%M:%S %p")),
        ],
        SubmissionOutcome::Rejected(notice) | SubmissionOutcome::Queued(notice) => vec![
            format!("Submission failed: {}", notice.message),
            format!("  {}", notice.suggestion),
        ],
    }
}

/// Map a rejection to an error so the process exits non-zero.
pub fn ensure_accepted(outcome: &SubmissionOutcome) -> Result<(), CliError> {
    match outcome {
        SubmissionOutcome::Rejected(notice) => Err(CliError::Rejected(notice.message.clone())),
        SubmissionOutcome::Success { .. } | SubmissionOutcome::Queued(_) => Ok(()),
    }
}

pub fn record_to_history_item(record: &AttendanceRecord, now_ms: i64) -> HistoryItem {
    HistoryItem {
        id: record.id.clone(),
        student_id: record.student_id.clone(),
        status: record.status.to_string(),
        date: record.date.clone(),
        time: format_local_time(record.timestamp),
        timestamp: record.timestamp,
        relative_time: format_relative_time(record.timestamp, now_ms),
    }
}

pub fn format_history_lines(records: &[AttendanceRecord]) -> Vec<String> {
    let now = unix_millis_now();
    records
        .iter()
        .map(|record| {
            let item = record_to_history_item(record, now);
            format!(
                "{:<8} {:<12} {} {} ({})",
                item.status, item.student_id, item.date, item.time, item.relative_time
            )
        })
        .collect()
}

pub fn format_stats_lines(stats: &AttendanceStats) -> Vec<String> {
    vec![
        format!("Total records:   {}", stats.total_records),
        format!("Present:         {}", stats.present_count),
        format!("Pending:         {}", stats.pending_count),
        format!("Attendance rate: {:.0}%", stats.attendance_rate),
    ]
}

pub fn format_queue_lines(queue: &[OfflineSubmission]) -> Vec<String> {
    queue
        .iter()
        .map(|submission| {
            format!(
                "{} {:<12} queued {} ({})",
                submission.id.chars().take(13).collect::<String>(),
                submission.student_id,
                format_local_time(submission.timestamp),
                format_relative_time(submission.timestamp, unix_millis_now())
            )
        })
        .collect()
}

pub fn format_local_time(timestamp_ms: i64) -> String {
    Local.timestamp_millis_opt(timestamp_ms).single().map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%-I:%M:%S %p").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}
