//! `reqwest` transport for the attendance server.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;

use super::{AttendanceTransport, ScanForm, ScanResponse, TransportError};
use crate::util::{is_http_url, normalize_text_option};

const MAX_REDIRECTS: usize = 10;

/// HTTP transport posting to `{base_url}/scan`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self {
            endpoint: format!("{base_url}/scan"),
            client,
        })
    }

    /// Full URL submissions are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AttendanceTransport for HttpTransport {
    async fn post_scan(&self, form: &ScanForm) -> Result<ScanResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form.encode())
            .send()
            .await
            .inspect_err(|error| tracing::warn!("Attendance request failed: {error}"))?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ScanResponse { status, body })
    }
}

fn normalize_base_url(raw: String) -> Result<String, TransportError> {
    let base_url = normalize_text_option(Some(raw)).ok_or_else(|| {
        TransportError::InvalidConfiguration("server URL must not be empty".to_string())
    })?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(TransportError::InvalidConfiguration(
            "server URL must include http:// or https://".to_string(),
        ))
    }
}
