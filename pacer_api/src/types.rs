//! Values produced by the report client.

use chrono::NaiveDate;
use url::Url;

use crate::Error;

/// Per-session anti-forgery token taken from the report form's action URL.
///
/// Bound to the session that fetched it and dropped with the dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One day's report page, unparsed.
#[derive(Clone, Debug)]
pub struct RawReportResponse {
    /// Final URL of the response, after redirects.
    pub source_url: Url,
    /// Court id resolved from `source_url`.
    pub court_id: String,
    /// The filing day this page covers.
    pub day: NaiveDate,
    pub status: u16,
    pub html_body: String,
}

impl RawReportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A day whose request failed in transit under the tolerant failure policy.
#[derive(Debug)]
pub struct FailedDay {
    pub day: NaiveDate,
    pub error: Error,
}

/// Output of one dispatch: responses in date order plus any tolerated failures.
#[derive(Debug, Default)]
pub struct ReportBatch {
    pub court_id: String,
    pub responses: Vec<RawReportResponse>,
    pub failed_days: Vec<FailedDay>,
}

impl ReportBatch {
    pub fn empty(court_id: &str) -> Self {
        Self {
            court_id: court_id.to_string(),
            ..Self::default()
        }
    }

    /// True when every requested day produced a response.
    pub fn is_complete(&self) -> bool {
        self.failed_days.is_empty()
    }
}
