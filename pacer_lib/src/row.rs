//! Schema-adaptive parsing of one written opinions report row.
//!
//! Most courts render five columns: case, date, document, description and a
//! NOS/cause cell. Eight courts (hib, deb, njb, ndb, ohnb, txsb, txwb, vaeb)
//! render only four, packing docket number and case name into one link.
//! Two more (areb, arwb) render five columns but lay out the case cell the
//! four-column way, so they are always parsed as four-column rows.
//!
//! When consecutive rows belong to the same case the report leaves the case
//! cell blank; those rows inherit the case identity of the previous parsed row:
//!
//! ```text
//! Joe v. Volcano | 12/31/2008 | 128 | The first doc from case | More here
//!                | 12/31/2008 | 129 | The 2nd doc from case   | More here
//! ```

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::dates::convert_date_string;
use crate::identifiers::{pacer_case_id_from_docket_url, pacer_document_number_from_doc1_url};

/// Courts whose five-column rows are laid out like four-column rows.
pub const FOUR_COLUMN_COURTS: &[&str] = &["areb", "arwb"];

/// One opinion listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpinionRecord {
    pub court_id: String,
    pub pacer_case_id: String,
    pub docket_number: String,
    pub case_name: String,
    pub case_date: NaiveDate,
    pub pacer_document_number: String,
    pub document_number: String,
    pub description: String,
    pub nature_of_suit: Option<String>,
    pub cause: Option<String>,
}

impl OpinionRecord {
    /// The fields a following blank-case row would inherit.
    pub fn identity(&self) -> CaseIdentity {
        CaseIdentity {
            pacer_case_id: self.pacer_case_id.clone(),
            docket_number: self.docket_number.clone(),
            case_name: self.case_name.clone(),
        }
    }
}

/// Case identity carried from one parsed row to the next.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaseIdentity {
    pub pacer_case_id: String,
    pub docket_number: String,
    pub case_name: String,
}

/// Why a single row could not be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("no table row found")]
    NoRow,
    #[error("row has {found} cells, expected at least 4")]
    TooFewCells { found: usize },
    #[error("blank case cell with no earlier row to inherit from")]
    NoPriorIdentity,
    #[error("case cell does not hold a docket number and case name: {0:?}")]
    MalformedCaseCell(String),
    #[error("no case id in docket link {0:?}")]
    BadDocketUrl(String),
    #[error("unparseable date {0:?}")]
    BadDate(String),
    #[error("document cell has no link")]
    MissingDocumentLink,
    #[error("no document number in link {0:?}")]
    BadDocumentUrl(String),
}

/// Column layout of a row, resolved once per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSchema {
    /// Case cell text is `DOCKET CASE NAME`; no NOS/cause cell.
    FourColumn,
    /// Docket number is the link text, case name is bold; fifth cell has NOS/cause.
    FiveColumn,
}

impl ColumnSchema {
    pub fn detect(cell_count: usize, court_id: &str) -> Self {
        if cell_count == 4 || FOUR_COLUMN_COURTS.contains(&court_id) {
            Self::FourColumn
        } else {
            Self::FiveColumn
        }
    }

    fn identity(
        self,
        cell: ElementRef<'_>,
        previous: Option<&CaseIdentity>,
    ) -> Result<CaseIdentity, RowError> {
        let Some((link, href)) = first_link(cell) else {
            tracing::info!(
                "No content provided in first cell of row. Using last good row for \
                 pacer_case_id, docket_number, and case_name."
            );
            return previous.cloned().ok_or(RowError::NoPriorIdentity);
        };
        let pacer_case_id = pacer_case_id_from_docket_url(href)
            .ok_or_else(|| RowError::BadDocketUrl(href.to_string()))?;

        match self {
            Self::FourColumn => {
                // e.g. "14-90018 Stewart v. Kauanui"
                let text = trimmed_text(cell);
                let (docket, name) = text
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| RowError::MalformedCaseCell(text.clone()))?;
                Ok(CaseIdentity {
                    pacer_case_id,
                    docket_number: docket.to_string(),
                    case_name: name.trim_start().to_string(),
                })
            }
            Self::FiveColumn => {
                let docket_number = trimmed_text(link);
                let case_name = match first_match(cell, "b") {
                    Some(b) => trimmed_text(b),
                    None => previous
                        .map(|p| p.case_name.clone())
                        .ok_or(RowError::NoPriorIdentity)?,
                };
                Ok(CaseIdentity {
                    pacer_case_id,
                    docket_number,
                    case_name,
                })
            }
        }
    }

    fn suit_details(self, cells: &[ElementRef<'_>]) -> (Option<String>, Option<String>) {
        match (self, cells.get(4)) {
            (Self::FiveColumn, Some(cell)) => {
                (marker_tail(*cell, "NOS"), marker_tail(*cell, "Cause"))
            }
            _ => (None, None),
        }
    }
}

/// Parses one `<tr>` into an [`OpinionRecord`].
///
/// `previous` is the identity of the last successfully parsed row and is
/// only read when this row's case cell is blank. Pure: the same row and
/// `previous` always produce the same result.
pub fn parse_row(
    row: ElementRef<'_>,
    previous: Option<&CaseIdentity>,
    court_id: &str,
) -> Result<OpinionRecord, RowError> {
    let cells = direct_cells(row);
    if cells.len() < 4 {
        return Err(RowError::TooFewCells { found: cells.len() });
    }
    let schema = ColumnSchema::detect(cells.len(), court_id);

    let identity = schema.identity(cells[0], previous)?;

    let date_text = first_text(cells[1]).unwrap_or_default();
    let case_date =
        convert_date_string(date_text).ok_or_else(|| RowError::BadDate(date_text.to_string()))?;

    let (_, doc_href) = first_link(cells[2]).ok_or(RowError::MissingDocumentLink)?;
    let pacer_document_number = pacer_document_number_from_doc1_url(doc_href)
        .ok_or_else(|| RowError::BadDocumentUrl(doc_href.to_string()))?;
    let document_number = first_text(cells[2]).unwrap_or_default().to_string();

    let description = cells[3].text().collect::<String>().trim().to_string();
    let (nature_of_suit, cause) = schema.suit_details(&cells);

    Ok(OpinionRecord {
        court_id: court_id.to_string(),
        pacer_case_id: identity.pacer_case_id,
        docket_number: identity.docket_number,
        case_name: identity.case_name,
        case_date,
        pacer_document_number,
        document_number,
        description,
        nature_of_suit,
        cause,
    })
}

/// Parses the first `<tr>` in an HTML snippet. The snippet is wrapped in a
/// `<table>` so bare rows survive HTML parsing.
pub fn parse_row_html(
    html: &str,
    previous: Option<&CaseIdentity>,
    court_id: &str,
) -> Result<OpinionRecord, RowError> {
    let document = Html::parse_document(&format!("<table>{}</table>", html));
    let row = first_match(document.root_element(), "tr").ok_or(RowError::NoRow)?;
    parse_row(row, previous, court_id)
}

/// First descendant of `el` matching `css`.
pub(crate) fn first_match<'a>(el: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    el.select(&selector).next()
}

/// The row's own `<td>` cells, ignoring cells of any table nested inside them.
fn direct_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let Ok(td) = Selector::parse("td") else {
        return Vec::new();
    };
    row.select(&td)
        .filter(|cell| cell.parent().map(|p| p.id()) == Some(row.id()))
        .collect()
}

fn first_link(el: ElementRef<'_>) -> Option<(ElementRef<'_>, &str)> {
    let link = first_match(el, "a[href]")?;
    Some((link, link.value().attr("href")?))
}

fn first_text(el: ElementRef<'_>) -> Option<&str> {
    el.text().map(str::trim).find(|t| !t.is_empty())
}

fn trimmed_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text following the `<i>` marker whose text contains `label`, e.g.
/// `<i>NOS</i> 890` yields `890`.
fn marker_tail(cell: ElementRef<'_>, label: &str) -> Option<String> {
    let italic = Selector::parse("i").ok()?;
    let marker = cell
        .select(&italic)
        .find(|e| e.text().any(|t| t.contains(label)))?;
    let tail = marker.next_sibling()?;
    let text = tail.value().as_text()?;
    Some(text.trim().to_string())
}
