//! rollcall-core - Core library for Rollcall
//!
//! This crate contains the attendance models, the local ledger, and the
//! offline-resilient submission pipeline shared by every Rollcall interface.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod util;

pub use client::{extract_token, SubmissionClient, SubmissionResult, TransportError};
pub use db::{Ledger, MemoryStore, SqliteStore};
pub use error::{Error, Result};
pub use models::{AttendanceRecord, AttendanceStats, AttendanceStatus, OfflineSubmission};
pub use pipeline::{ReconcileReport, Reconciler, ScanGate, SubmissionOutcome, SubmissionSession};
