//! Report query: court, inclusive date range and session credential.

use chrono::NaiveDate;
use reqwest::multipart::Form;
use serde::Deserialize;

use crate::Error;

/// Session cookie installed into the query's cookie jar before the token fetch.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SessionCredential {
    pub name: String,
    pub value: String,
    /// Cookie domain. Defaults to the report host.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl SessionCredential {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: None,
            path: None,
        }
    }

    /// Renders the credential as a `Set-Cookie` style string.
    pub fn to_cookie_string(&self) -> String {
        let mut s = format!("{}={}", self.name, self.value);
        if let Some(ref domain) = self.domain {
            s.push_str(&format!("; Domain={}", domain));
        }
        s.push_str(&format!("; Path={}", self.path.as_deref().unwrap_or("/")));
        s
    }
}

/// One unit of report work: a court and an inclusive range of filing dates.
#[derive(Clone, Debug)]
pub struct ReportQuery {
    pub court_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub credential: Option<SessionCredential>,
}

impl ReportQuery {
    /// Builds a query. The court id is lowercased; `start` must not be after `end`.
    pub fn new(court_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidQuery(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self {
            court_id: court_id.trim().to_ascii_lowercase(),
            start,
            end,
            credential: None,
        })
    }

    /// A query covering a single day.
    pub fn single_day(court_id: &str, day: NaiveDate) -> Self {
        Self {
            court_id: court_id.trim().to_ascii_lowercase(),
            start: day,
            end: day,
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: SessionCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Every calendar day in the range, ascending, both ends included.
    ///
    /// The report generator fails or truncates on multi-day ranges, so the
    /// dispatcher always queries one of these at a time.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }
}

/// Formats a day the way the report form expects (`MM/DD/YYYY`).
pub fn format_day(day: NaiveDate) -> String {
    day.format("%m/%d/%Y").to_string()
}

/// Multipart form for a single-day report: full results, sorted by case number.
pub(crate) fn report_form(day: NaiveDate) -> Form {
    let d = format_day(day);
    Form::new()
        .text("filed_from", d.clone())
        .text("filed_to", d)
        .text("ShowFull", "1")
        .text("Key1", "cs_sort_case_numb")
        .text("all_case_ids", "0")
}
