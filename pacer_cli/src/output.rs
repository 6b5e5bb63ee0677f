use anyhow::Result;
use pacer_lib::OpinionRecord;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct OpinionRow {
    #[tabled(rename = "Filed")]
    #[serde(rename = "Filed")]
    case_date: String,
    #[tabled(rename = "Docket")]
    #[serde(rename = "Docket")]
    docket_number: String,
    #[tabled(rename = "Case")]
    #[serde(rename = "Case")]
    case_name: String,
    #[tabled(rename = "Doc #")]
    #[serde(rename = "Doc #")]
    document_number: String,
    #[tabled(rename = "PACER Doc")]
    #[serde(rename = "PACER Doc")]
    pacer_document_number: String,
    #[tabled(rename = "Description")]
    #[serde(rename = "Description")]
    description: String,
    #[tabled(rename = "NOS")]
    #[serde(rename = "NOS")]
    nature_of_suit: String,
}

#[derive(Tabled, Serialize)]
pub struct CourtRow {
    #[tabled(rename = "Court")]
    #[serde(rename = "Court")]
    pub court: String,
    #[tabled(rename = "Handling")]
    #[serde(rename = "Handling")]
    pub handling: String,
}

const MAX_DESCRIPTION_CHARS: usize = 60;

fn build_opinion_rows(records: &[OpinionRecord]) -> Vec<OpinionRow> {
    records
        .iter()
        .map(|r| OpinionRow {
            case_date: r.case_date.format("%Y-%m-%d").to_string(),
            docket_number: r.docket_number.clone(),
            case_name: r.case_name.clone(),
            document_number: r.document_number.clone(),
            pacer_document_number: r.pacer_document_number.clone(),
            description: truncate(&r.description, MAX_DESCRIPTION_CHARS),
            nature_of_suit: r.nature_of_suit.clone().unwrap_or_default(),
        })
        .collect()
}

/// One row per (court, handling) pair, sorted by court id.
pub fn build_court_rows(
    unsupported: &[String],
    relaxed_tls: &[String],
    four_column: &[String],
) -> Vec<CourtRow> {
    let mut rows: Vec<CourtRow> = [
        ("unsupported", unsupported),
        ("relaxed-tls", relaxed_tls),
        ("four-column", four_column),
    ]
    .iter()
    .flat_map(|(handling, courts)| {
        courts.iter().map(move |c| CourtRow {
            court: c.clone(),
            handling: handling.to_string(),
        })
    })
    .collect();
    rows.sort_by(|a, b| a.court.cmp(&b.court).then(a.handling.cmp(&b.handling)));
    rows
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

pub fn print_opinions_table(records: &[OpinionRecord]) {
    println!("{}", Table::new(build_opinion_rows(records)));
}

pub fn print_courts_table(rows: &[CourtRow]) {
    println!("{}", Table::new(rows));
}

// -- Markdown output --

pub fn print_opinions_markdown(records: &[OpinionRecord]) {
    let mut table = Table::new(build_opinion_rows(records));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_courts_markdown(rows: &[CourtRow]) {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

/// CSV keeps every field untruncated, including cause.
pub fn print_opinions_csv(records: &[OpinionRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_courts_csv(rows: &[CourtRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
