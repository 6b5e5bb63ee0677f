use chrono::NaiveDate;
use pacer_api::SessionCredential;

use crate::error::FreeDocumentsError;

pub const MAX_COURT_ID_LENGTH: usize = 8;

/// Validate a court id: 2-8 ASCII letters or digits, normalized to lowercase.
pub fn validate_court_id(input: &str) -> Result<String, FreeDocumentsError> {
    let normalized = input.trim().to_ascii_lowercase();
    if normalized.len() < 2
        || normalized.len() > MAX_COURT_ID_LENGTH
        || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(FreeDocumentsError::InvalidInput(format!(
            "invalid court id '{}'. Expected a PACER court id (e.g., dcd, nysd, ohnd)",
            input.trim()
        )));
    }
    Ok(normalized)
}

/// Validate a date string in YYYY-MM-DD format.
pub fn validate_date(input: &str) -> Result<NaiveDate, FreeDocumentsError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        FreeDocumentsError::InvalidInput(format!(
            "invalid date '{}'. Expected format: YYYY-MM-DD (e.g., 2024-06-01)",
            trimmed
        ))
    })
}

/// Validate that `start` is not after `end`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), FreeDocumentsError> {
    if start > end {
        return Err(FreeDocumentsError::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok(())
}

/// Parse a `name=value` session cookie. The value may itself contain `=`.
pub fn parse_cookie(input: &str) -> Result<SessionCredential, FreeDocumentsError> {
    let trimmed = input.trim();
    let (name, value) = trimmed.split_once('=').ok_or_else(|| {
        FreeDocumentsError::InvalidInput("cookie must look like name=value".to_string())
    })?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return Err(FreeDocumentsError::InvalidInput(
            "cookie name and value must not be empty".to_string(),
        ));
    }
    if name.chars().any(|c| c.is_whitespace() || c == ';') || value.contains(';') {
        return Err(FreeDocumentsError::InvalidInput(format!(
            "cookie '{}' contains invalid characters",
            name
        )));
    }
    Ok(SessionCredential::new(name, value))
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
