//! CLI argument definitions for ptrscan.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Fetch a filing through the cache and extract its trades |
//! | `parse` | Extract trades from a report already on disk |
//! | `cache-key` | Show where a filing URL would be cached |
//!
//! # Examples
//!
//! ```bash
//! ptrscan scan --chamber house --member "Jane Doe" \
//!     --url https://disclosures-clerk.house.gov/public_disc/ptr-pdfs/2024/20024567.pdf --pretty
//!
//! ptrscan parse --chamber senate --member "John Roe" --file ./ptr.html
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ptrscan_core::Chamber;

/// Extract normalized trades from periodic transaction reports.
#[derive(Debug, Parser)]
#[command(
    name = "ptrscan",
    author,
    version,
    about = "Periodic transaction report trade extractor"
)]
pub struct Cli {
    /// JSON config file. Missing keys keep their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured cache directory.
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log line format on stderr. Filter with RUST_LOG.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a filing (cached) and extract its trades.
    Scan(ScanArgs),
    /// Extract trades from a local report file.
    Parse(ParseArgs),
    /// Print the cache file name and path for a filing URL.
    CacheKey(CacheKeyArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// house or senate.
    #[arg(long)]
    pub chamber: Chamber,

    /// Filing URL.
    #[arg(long)]
    pub url: String,

    /// Filer name copied onto every record.
    #[arg(long)]
    pub member: String,

    /// Disclosure date (YYYY-MM-DD) for tables without one.
    #[arg(long)]
    pub disclosure_date: Option<NaiveDate>,

    /// Cookie header for an authenticated session.
    #[arg(long)]
    pub cookie: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ParseArgs {
    /// house or senate.
    #[arg(long)]
    pub chamber: Chamber,

    /// Report file. `.pdf`, `.html` and `.htm` pick the format, anything else follows the chamber.
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long)]
    pub member: String,

    /// Recorded on each trade. Defaults to the file path.
    #[arg(long)]
    pub filing_url: Option<String>,

    #[arg(long)]
    pub disclosure_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Args)]
pub struct CacheKeyArgs {
    #[arg(long)]
    pub chamber: Chamber,

    #[arg(long)]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_arguments_parse_typed_values() {
        let cli = Cli::try_parse_from([
            "ptrscan",
            "--pretty",
            "scan",
            "--chamber",
            "Senate",
            "--url",
            "https://efdsearch.senate.gov/search/view/ptr/abc/",
            "--member",
            "John Roe",
            "--disclosure-date",
            "2024-03-01",
        ])
        .expect("arguments should parse");

        assert!(cli.pretty);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.chamber, Chamber::Senate);
        assert_eq!(args.disclosure_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(args.cookie.is_none());
    }

    #[test]
    fn unknown_chamber_is_rejected() {
        let result = Cli::try_parse_from([
            "ptrscan",
            "cache-key",
            "--chamber",
            "assembly",
            "--url",
            "https://example.test/1.pdf",
        ]);

        assert!(result.is_err());
    }
}
