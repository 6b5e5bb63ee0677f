//! Loose date-string interpretation for report cells.

use chrono::NaiveDate;

/// Formats tried in order once the input has been normalized.
const FORMATS: &[&str] = &[
    "%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y", "%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%b %d %Y",
    "%d %B %Y", "%d %b %Y",
];

/// Parses the date text found in report cells, e.g. `12/31/2017`,
/// `1/5/17`, `2017-12-31` or `Dec. 31, 2017`.
pub fn convert_date_string(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('.', "")
        .replace("Sept ", "Sep ");
    let cleaned = cleaned.trim_matches(|c: char| c == ',' || c.is_whitespace());
    if cleaned.is_empty() {
        return None;
    }

    // Two-digit years would otherwise parse as the first century under %Y.
    if let Some((_, year)) = cleaned.rsplit_once('/') {
        if year.len() == 2 {
            return NaiveDate::parse_from_str(cleaned, "%m/%d/%y").ok();
        }
    }

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn us_slash_dates() {
        assert_eq!(convert_date_string("12/31/2017"), Some(date(2017, 12, 31)));
        assert_eq!(convert_date_string(" 1/5/2024\n"), Some(date(2024, 1, 5)));
    }

    #[test]
    fn two_digit_year() {
        assert_eq!(convert_date_string("01/05/24"), Some(date(2024, 1, 5)));
    }

    #[test]
    fn iso_date() {
        assert_eq!(convert_date_string("2017-12-31"), Some(date(2017, 12, 31)));
    }

    #[test]
    fn month_names() {
        assert_eq!(convert_date_string("December 31, 2017"), Some(date(2017, 12, 31)));
        assert_eq!(convert_date_string("Dec. 31, 2017"), Some(date(2017, 12, 31)));
        assert_eq!(convert_date_string("Sept. 4, 2018"), Some(date(2018, 9, 4)));
        assert_eq!(convert_date_string("4 September 2018"), Some(date(2018, 9, 4)));
    }

    #[test]
    fn garbage_rejected() {
        assert_eq!(convert_date_string(""), None);
        assert_eq!(convert_date_string("   "), None);
        assert_eq!(convert_date_string("not a date"), None);
        assert_eq!(convert_date_string("13/45/2017"), None);
    }
}
