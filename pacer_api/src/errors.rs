//! Error types for the report client.

use chrono::NaiveDate;

/// Errors that can occur while fetching a written opinions report.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The per-session HTTP client could not be constructed.
    #[error("Failed to build HTTP client for {court_id}")]
    ClientBuild {
        court_id: String,
        #[source]
        source: reqwest::Error,
    },
    /// A report URL could not be constructed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The query itself is unusable (e.g. start after end).
    #[error("Invalid report query: {0}")]
    InvalidQuery(String),
    /// The token page could not be fetched.
    #[error("Token request to {url} failed")]
    TokenRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The token page returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The token page loaded but carried no form token.
    #[error("No report token found on {url}")]
    TokenNotFound { url: String },
    /// A single day's report request failed in transit (network error or timeout).
    #[error("Report request for {court_id} on {day} failed")]
    Transport {
        court_id: String,
        day: NaiveDate,
        #[source]
        source: reqwest::Error,
    },
}

impl Error {
    /// True for failures that happened before any report day was queried.
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            Self::TokenRequest { .. } | Self::HttpStatus { .. } | Self::TokenNotFound { .. }
        )
    }
}
