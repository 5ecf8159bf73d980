use std::fs;
use std::path::Path;

use ptrscan_core::{DisclosureParser, Document, DocumentKind, ScanConfig};
use serde_json::json;

use super::{filing_context, CommandResult};
use crate::cli::ParseArgs;
use crate::error::CliError;

pub fn run(args: &ParseArgs, config: &ScanConfig) -> Result<CommandResult, CliError> {
    let filing_url = args
        .filing_url
        .clone()
        .unwrap_or_else(|| args.file.display().to_string());
    let context = filing_context(&args.member, args.chamber, &filing_url, args.disclosure_date)?;

    let kind = kind_for_path(&args.file).unwrap_or(args.chamber.document_kind());
    let document = Document::from_bytes(kind, fs::read(&args.file)?);

    let parser = DisclosureParser::from_config(config);
    let records = parser.parse_document(&document, &context);

    Ok(CommandResult::ok(json!({
        "records": records,
        "stats": parser.stats().snapshot(),
    })))
}

fn kind_for_path(path: &Path) -> Option<DocumentKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some(DocumentKind::Pdf),
        "html" | "htm" => Some(DocumentKind::Html),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptrscan_core::Chamber;

    #[test]
    fn extension_overrides_chamber_format() {
        assert_eq!(kind_for_path(Path::new("ptr.HTM")), Some(DocumentKind::Html));
        assert_eq!(kind_for_path(Path::new("ptr.pdf")), Some(DocumentKind::Pdf));
        assert_eq!(kind_for_path(Path::new("ptr")), None);
    }

    #[test]
    fn local_senate_page_yields_records_and_stats() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("report.html");
        fs::write(
            &file,
            "<table><tr><th>Asset Name</th><th>Type</th><th>Amount</th></tr>\
             <tr><td>Apple Inc. (AAPL)</td><td>Sale (Full)</td><td>$15,001 - $50,000</td></tr></table>",
        )
        .expect("write report");
        let args = ParseArgs {
            chamber: Chamber::Senate,
            file,
            member: String::from("John Roe"),
            filing_url: None,
            disclosure_date: None,
        };

        let result = run(&args, &ScanConfig::default()).expect("parse should succeed");

        assert!(!result.unavailable);
        assert_eq!(result.data["records"][0]["ticker"], "AAPL");
        assert_eq!(result.data["records"][0]["transaction_type"], "sale");
        assert_eq!(result.data["stats"]["rows_extracted"], 1);
    }

    #[test]
    fn blank_member_is_rejected() {
        let args = ParseArgs {
            chamber: Chamber::House,
            file: "missing.pdf".into(),
            member: String::from("  "),
            filing_url: None,
            disclosure_date: None,
        };

        let err = run(&args, &ScanConfig::default())
            .err()
            .expect("blank member must fail");
        assert_eq!(err.exit_code(), 2);
    }
}
