//! Attendance submission client.
//!
//! Turns a roll number and a scanned QR payload into one exchange with the
//! attendance server and classifies the answer. A response that arrives but
//! is not recognized as an acceptance is a logical failure (`success: false`);
//! only a missing response is an error.

mod http;

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::util::compact_text;

pub use http::HttpTransport;

static TOKEN_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"token=([0-9]+)").expect("Invalid regex"));

const ACCEPTANCE_MARKERS: [&str; 2] = ["Present", "Welcome"];

/// Transport-level failure: no interpretable response was obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid server configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Network error: {0}")]
    Unreachable(String),
}

/// Form fields posted to `/scan`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanForm {
    pub student_id: String,
    pub token: String,
}

impl ScanForm {
    /// `application/x-www-form-urlencoded` body
    pub fn encode(&self) -> String {
        format!(
            "student_id={}&token={}",
            urlencoding::encode(&self.student_id),
            urlencoding::encode(&self.token)
        )
    }
}

/// Raw server answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResponse {
    pub status: u16,
    pub body: String,
}

impl ScanResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status and an acceptance marker somewhere in the body
    pub fn is_acceptance(&self) -> bool {
        (200..300).contains(&self.status)
            && ACCEPTANCE_MARKERS
                .iter()
                .any(|marker| self.body.contains(marker))
    }
}

/// The network seam of the submission client
#[allow(async_fn_in_trait)]
pub trait AttendanceTransport {
    /// Perform one POST to the scan endpoint, following redirects
    async fn post_scan(&self, form: &ScanForm) -> Result<ScanResponse, TransportError>;
}

/// Classified outcome of a submission that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub success: bool,
    pub student_name: Option<String>,
    pub message: Option<String>,
}

/// Stateless submission client over a transport
#[derive(Debug, Clone)]
pub struct SubmissionClient<T> {
    transport: T,
}

impl<T: AttendanceTransport> SubmissionClient<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit `raw_token` (bare digits or a URL carrying `token=<digits>`)
    /// for `student_id`.
    pub async fn submit(
        &self,
        student_id: &str,
        raw_token: &str,
    ) -> Result<SubmissionResult, TransportError> {
        let form = ScanForm {
            student_id: student_id.to_string(),
            token: extract_token(raw_token).to_string(),
        };

        let response = self.transport.post_scan(&form).await?;
        tracing::debug!(
            status = response.status,
            body = %compact_text(&response.body),
            "Attendance server response"
        );

        if response.is_acceptance() {
            Ok(SubmissionResult {
                success: true,
                student_name: Some(student_id.to_string()),
                message: Some("Attendance marked successfully".to_string()),
            })
        } else {
            Ok(SubmissionResult {
                success: false,
                student_name: None,
                message: Some("Invalid token or student ID".to_string()),
            })
        }
    }
}

/// Pull the first run of digits after `token=` out of a scanned payload,
/// falling back to the payload itself.
///
/// ```
/// use rollcall_core::extract_token;
///
/// assert_eq!(extract_token("https://x/y?token=12345"), "12345");
/// assert_eq!(extract_token("12345"), "12345");
/// ```
pub fn extract_token(raw: &str) -> &str {
    TOKEN_PARAM
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map_or(raw, |digits| digits.as_str())
}
