use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use pacer_lib::validation;
use pacer_lib::{DayFailurePolicy, FreeDocumentsClient, ReportQuery, Settings};

use crate::output::{
    print_json, print_opinions_csv, print_opinions_markdown, print_opinions_table, OutputFormat,
};

#[derive(Args)]
pub struct ReportArgs {
    /// Court id (e.g. dcd, nysd, ohnd)
    #[arg(long)]
    pub court: String,

    /// First filing date, YYYY-MM-DD
    #[arg(long)]
    pub from: String,

    /// Last filing date, YYYY-MM-DD (defaults to --from)
    #[arg(long)]
    pub to: Option<String>,

    /// Session cookie as name=value (falls back to PACER_COOKIE)
    #[arg(long, env = "PACER_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Number of days fetched at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Keep going when a single day fails to download
    #[arg(long)]
    pub tolerate_failures: bool,

    /// Send requests to this base URL instead of the court's ECF host
    #[arg(long, hide = true)]
    pub base_url: Option<String>,
}

pub async fn run(args: &ReportArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let court = validation::validate_court_id(&args.court)?;
    let start = validation::validate_date(&args.from)?;
    let end = match args.to {
        Some(ref to) => validation::validate_date(to)?,
        None => start,
    };
    validation::validate_date_range(start, end)?;

    let mut query = ReportQuery::new(&court, start, end)?;
    if let Some(ref cookie) = args.cookie {
        query = query.with_credential(validation::parse_cookie(cookie)?);
    }

    let mut settings = settings.clone();
    if let Some(n) = args.concurrency {
        settings.client = settings.client.with_max_concurrent_days(n);
    }
    if args.tolerate_failures {
        settings.client = settings.client.with_day_failure(DayFailurePolicy::Tolerate);
    }

    let client = match args.base_url {
        Some(ref base) => FreeDocumentsClient::with_base_url(base, &settings),
        None => FreeDocumentsClient::new(&settings),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!(
        "Fetching {} opinions for {} day(s)",
        court,
        query.days().len()
    ));

    let result = client.query(&query).await;
    pb.finish_and_clear();
    let report = result.with_context(|| format!("report query for {} failed", court))?;

    eprintln!(
        "{}: {} opinions from {} to {}",
        report.court_id,
        report.records.len(),
        report.start,
        report.end
    );
    if !report.skipped_rows.is_empty() {
        eprintln!("Skipped {} unparseable row(s):", report.skipped_rows.len());
        for skipped in &report.skipped_rows {
            eprintln!("  {} row {}: {}", skipped.day, skipped.row, skipped.reason);
        }
    }
    if !report.is_complete() {
        let days: Vec<String> = report.failed_days.iter().map(|d| d.to_string()).collect();
        eprintln!("Failed to fetch {} day(s): {}", days.len(), days.join(", "));
    }

    match format {
        OutputFormat::Table => print_opinions_table(&report.records),
        OutputFormat::Json => print_json(&report.records),
        OutputFormat::Csv => print_opinions_csv(&report.records)?,
        OutputFormat::Markdown => print_opinions_markdown(&report.records),
    }

    Ok(())
}
