mod cache_key;
mod parse;
mod scan;

use chrono::NaiveDate;
use ptrscan_core::{Chamber, FilingContext, ScanConfig};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    /// The filing could not be fetched; output is still written.
    pub unavailable: bool,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            unavailable: false,
        }
    }

    pub fn with_unavailable(mut self, unavailable: bool) -> Self {
        self.unavailable = unavailable;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Scan(args) => scan::run(args, &config).await,
        Command::Parse(args) => parse::run(args, &config),
        Command::CacheKey(args) => cache_key::run(args, &config),
    }
}

fn load_config(cli: &Cli) -> Result<ScanConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = dir.clone();
    }
    Ok(config)
}

fn filing_context(
    member: &str,
    chamber: Chamber,
    filing_url: &str,
    disclosure_date: Option<NaiveDate>,
) -> Result<FilingContext, CliError> {
    if member.trim().is_empty() {
        return Err(CliError::Command(String::from("--member cannot be empty")));
    }
    let context = FilingContext::new(member.trim(), chamber, filing_url);
    Ok(match disclosure_date {
        Some(date) => context.with_disclosure_date(date),
        None => context,
    })
}
