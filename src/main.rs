use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use apexcov::cli;
use apexcov::report::OutputMode;
use apexcov::salesforce::{OrgConfig, DEFAULT_API_VERSION};

/// apexcov — per-class Apex code coverage as JSON or CSV.
#[derive(Parser)]
#[command(name = "apexcov", version, about)]
struct Cli {
    /// Output format: "csv" for comma-delimited text, anything else for JSON.
    #[arg(short, long, default_value = "")]
    format: String,

    /// Read classes and coverage from a JSON snapshot instead of an org.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Org instance URL, e.g. https://mydomain.my.salesforce.com
    #[arg(long, env = "SF_INSTANCE_URL")]
    instance_url: Option<String>,

    /// Access token for the org.
    #[arg(long, env = "SF_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Salesforce API version.
    #[arg(long, env = "SF_API_VERSION", default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Write the report to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = OutputMode::from_flag(&cli.format);

    let out = match cli.snapshot {
        Some(path) => cli::cmd_report_snapshot(&path, mode)?,
        None => cli::cmd_report_org(
            OrgConfig {
                instance_url: cli.instance_url,
                access_token: cli.access_token,
                api_version: cli.api_version,
                timeout: Duration::from_secs(cli.timeout_secs),
            },
            mode,
        )?,
    };

    match cli.output {
        Some(path) => std::fs::write(&path, out)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{out}"),
    }
    Ok(())
}
