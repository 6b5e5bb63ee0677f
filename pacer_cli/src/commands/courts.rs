use anyhow::Result;
use clap::Args;
use pacer_lib::row::FOUR_COLUMN_COURTS;
use pacer_lib::Settings;

use crate::output::{
    build_court_rows, print_courts_csv, print_courts_markdown, print_courts_table, print_json,
    OutputFormat,
};

#[derive(Args)]
pub struct CourtsArgs {
    /// Only show courts with this handling: unsupported, relaxed-tls, four-column
    #[arg(long)]
    pub handling: Option<String>,
}

pub fn run(args: &CourtsArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let four_column: Vec<String> = FOUR_COLUMN_COURTS.iter().map(|c| c.to_string()).collect();
    let mut rows = build_court_rows(
        &settings.client.unsupported_courts,
        &settings.client.relaxed_tls_courts,
        &four_column,
    );

    if let Some(ref handling) = args.handling {
        let wanted = handling.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "unsupported" | "relaxed-tls" | "four-column" => {}
            other => anyhow::bail!(
                "unknown handling '{}'. Expected unsupported, relaxed-tls, or four-column",
                other
            ),
        }
        rows.retain(|r| r.handling == wanted);
    }

    match format {
        OutputFormat::Table => print_courts_table(&rows),
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Csv => print_courts_csv(&rows)?,
        OutputFormat::Markdown => print_courts_markdown(&rows),
    }

    Ok(())
}
