//! Report assembly: turns a day-ordered batch of report pages into records.

use chrono::NaiveDate;
use pacer_api::types::RawReportResponse;
use scraper::{ElementRef, Html, Selector};

use crate::error::FreeDocumentsError;
use crate::row::{first_match, parse_row, CaseIdentity, OpinionRecord, RowError};

/// Label of the bold element whose trailing text holds the page's opinion count.
pub const OPINION_COUNT_MARKER: &str = "Total number of opinions reported";

/// A row left out of the result because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub court_id: String,
    pub day: NaiveDate,
    /// Position among the page's data rows, starting at 0.
    pub row: usize,
    pub reason: RowError,
}

/// Records parsed from a batch, in report order, plus rows that were skipped.
#[derive(Debug, Default)]
pub struct Assembly {
    pub records: Vec<OpinionRecord>,
    pub skipped_rows: Vec<SkippedRow>,
}

/// Parses every page in `responses`, in order.
///
/// A non-success page fails the whole assembly. Pages reporting zero
/// opinions are skipped without further inspection. The case identity of
/// the last parsed row carries across pages; rows that fail to parse are
/// logged, recorded in [`Assembly::skipped_rows`], and do not update it.
pub fn assemble(responses: &[RawReportResponse]) -> Result<Assembly, FreeDocumentsError> {
    let mut assembly = Assembly::default();
    let mut carry: Option<CaseIdentity> = None;
    let mut court_id = "Court not yet set.";

    for resp in responses {
        court_id = resp.court_id.as_str();
        if !resp.is_success() {
            tracing::error!(
                "Report for {} on {} failed with status {}",
                resp.court_id,
                resp.day,
                resp.status
            );
            return Err(FreeDocumentsError::HttpStatus {
                court_id: resp.court_id.clone(),
                day: resp.day,
                status: resp.status,
            });
        }

        let document = Html::parse_document(&resp.html_body);
        let count = opinion_count(&document)
            .ok_or_else(|| parse_error(resp, "missing opinion count"))?;
        if count == 0 {
            tracing::debug!("No opinions for {} on {}", resp.court_id, resp.day);
            continue;
        }

        let rows = data_rows(&document).ok_or_else(|| parse_error(resp, "missing result table"))?;
        for (idx, row) in rows.into_iter().enumerate() {
            match parse_row(row, carry.as_ref(), &resp.court_id) {
                Ok(record) => {
                    carry = Some(record.identity());
                    assembly.records.push(record);
                }
                Err(reason) => {
                    tracing::warn!(
                        "Skipping row {} for {} on {}: {}",
                        idx,
                        resp.court_id,
                        resp.day,
                        reason
                    );
                    assembly.skipped_rows.push(SkippedRow {
                        court_id: resp.court_id.clone(),
                        day: resp.day,
                        row: idx,
                        reason,
                    });
                }
            }
        }
    }

    tracing::info!(
        "Parsed {} results from {}",
        assembly.records.len(),
        court_id
    );
    Ok(assembly)
}

fn parse_error(resp: &RawReportResponse, message: &str) -> FreeDocumentsError {
    tracing::error!(
        "Cannot read report for {} on {}: {}",
        resp.court_id,
        resp.day,
        message
    );
    FreeDocumentsError::Parse {
        court_id: resp.court_id.clone(),
        day: resp.day,
        message: message.to_string(),
    }
}

/// Reads the number following the opinion count marker, e.g.
/// `<b>Total number of opinions reported:</b> 12`.
pub(crate) fn opinion_count(document: &Html) -> Option<u64> {
    let bold = Selector::parse("b").ok()?;
    let marker = document
        .select(&bold)
        .find(|e| e.text().any(|t| t.contains(OPINION_COUNT_MARKER)))?;

    let inside: String = marker.text().collect();
    let after_label = inside
        .split_once(OPINION_COUNT_MARKER)
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default();
    let tail = marker
        .next_sibling()
        .and_then(|n| n.value().as_text().map(|t| t.to_string()))
        .unwrap_or_default();

    first_number(&after_label).or_else(|| first_number(&tail))
}

fn first_number(s: &str) -> Option<u64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Every row of the first table except its header row.
fn data_rows(document: &Html) -> Option<Vec<ElementRef<'_>>> {
    let table = first_match(document.root_element(), "table")?;
    let tr = Selector::parse("tr").ok()?;
    Some(table.select(&tr).skip(1).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn page(court: &str, d: u32, status: u16, body: &str) -> RawReportResponse {
        RawReportResponse {
            source_url: Url::parse(&format!(
                "https://ecf.{}.uscourts.gov/cgi-bin/WrtOpRpt.pl?tok",
                court
            ))
            .unwrap(),
            court_id: court.to_string(),
            day: day(d),
            status,
            html_body: body.to_string(),
        }
    }

    fn report_body(count: usize, rows: &str) -> String {
        format!(
            "<html><body><table>\
             <tr><th>Case</th><th>Date</th><th>Doc</th><th>Description</th></tr>\
             {}</table>\
             <p><b>Total number of opinions reported:</b> {}</p></body></html>",
            rows, count
        )
    }

    const ROW_ONE: &str = r#"<tr><td><a href="/cgi-bin/DktRpt.pl?12345">123-45 Doe v. Roe</a></td><td>01/02/2024</td><td><a href="/doc1/12345678901">1</a></td><td>Opinion</td></tr>"#;
    const ROW_TWO: &str = r#"<tr><td></td><td>01/02/2024</td><td><a href="/doc1/12345678955">2</a></td><td>Second opinion</td></tr>"#;
    const BAD_ROW: &str = r#"<tr><td><a href="/cgi-bin/DktRpt.pl?777">7-7 A v. B</a></td><td>01/02/2024</td><td>no link</td><td>Broken</td></tr>"#;

    #[test]
    fn two_row_carry_forward() {
        let resp = page("hib", 2, 200, &report_body(2, &format!("{}{}", ROW_ONE, ROW_TWO)));
        let out = assemble(&[resp]).unwrap();
        assert_eq!(out.records.len(), 2);
        let (a, b) = (&out.records[0], &out.records[1]);
        assert_eq!(a.pacer_case_id, "12345");
        assert_eq!(a.docket_number, "123-45");
        assert_eq!(a.case_name, "Doe v. Roe");
        assert_eq!(a.identity(), b.identity());
        assert_eq!(a.pacer_document_number, "12305678901");
        assert_eq!(b.pacer_document_number, "12305678955");
        assert_eq!(b.document_number, "2");
        assert!(out.skipped_rows.is_empty());
    }

    #[test]
    fn zero_count_page_is_skipped_even_if_malformed() {
        let body = "<html><b>Total number of opinions reported:</b> 0 <table><tr><td>junk";
        let out = assemble(&[page("dcd", 2, 200, body)]).unwrap();
        assert!(out.records.is_empty());
        assert!(out.skipped_rows.is_empty());
    }

    #[test]
    fn failed_status_fails_assembly() {
        let good = page("hib", 2, 200, &report_body(1, ROW_ONE));
        let bad = page("hib", 3, 500, "oops");
        let err = assemble(&[good, bad]).unwrap_err();
        match err {
            FreeDocumentsError::HttpStatus { court_id, day: d, status } => {
                assert_eq!(court_id, "hib");
                assert_eq!(d, day(3));
                assert_eq!(status, 500);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_marker_is_parse_error() {
        let err = assemble(&[page("dcd", 2, 200, "<html>Log in</html>")]).unwrap_err();
        assert!(matches!(err, FreeDocumentsError::Parse { .. }));
    }

    #[test]
    fn missing_table_with_results_is_parse_error() {
        let body = "<html><b>Total number of opinions reported:</b> 3</html>";
        let err = assemble(&[page("dcd", 2, 200, body)]).unwrap_err();
        assert!(matches!(err, FreeDocumentsError::Parse { .. }));
    }

    #[test]
    fn bad_row_is_skipped_and_does_not_break_carry() {
        let rows = format!("{}{}{}", ROW_ONE, BAD_ROW, ROW_TWO);
        let out = assemble(&[page("hib", 2, 200, &report_body(3, &rows))]).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].pacer_case_id, "12345");
        assert_eq!(out.skipped_rows.len(), 1);
        assert_eq!(out.skipped_rows[0].row, 1);
        assert_eq!(out.skipped_rows[0].reason, RowError::MissingDocumentLink);
    }

    #[test]
    fn leading_blank_row_is_skipped() {
        let out = assemble(&[page("hib", 2, 200, &report_body(1, ROW_TWO))]).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.skipped_rows[0].reason, RowError::NoPriorIdentity);
    }

    #[test]
    fn carry_forward_spans_days() {
        let first = page("hib", 2, 200, &report_body(1, ROW_ONE));
        let second = page("hib", 3, 200, &report_body(1, ROW_TWO));
        let out = assemble(&[first, second]).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].case_name, "Doe v. Roe");
    }

    #[test]
    fn count_inside_or_after_marker() {
        let doc = Html::parse_document("<b>Total number of opinions reported: 7</b>");
        assert_eq!(opinion_count(&doc), Some(7));
        let doc = Html::parse_document("<b>Total number of opinions reported</b>\n 12\n");
        assert_eq!(opinion_count(&doc), Some(12));
        let doc = Html::parse_document("<b>Something else</b> 3");
        assert_eq!(opinion_count(&doc), None);
    }
}
