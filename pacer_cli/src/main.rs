mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pacer_lib::Settings;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "pacer")]
#[command(about = "Fetch the PACER written opinions report for a court and date range")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Path to a TOML settings file ([client] and [retry] tables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and parse written opinions for a court and date range
    Report(commands::report::ReportArgs),
    /// List courts with special handling
    Courts(commands::courts::CourtsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("pacer=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "md" | "markdown" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let settings = Settings::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Report(args) => commands::report::run(args, &settings, &format).await?,
        Commands::Courts(args) => commands::courts::run(args, &settings, &format)?,
    }

    Ok(())
}
