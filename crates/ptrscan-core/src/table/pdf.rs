use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::cache::{Document, DocumentKind};
use crate::columns::{ColumnRules, PDF_COLUMN_RULES};
use crate::error::ParseError;
use crate::normalize::is_placeholder;

use super::layout::{group_lines, table_rows, text_runs, Line};
use super::{find_resolvable_header, mismatch, split_at, IndexedRow, LocatedTable, TableOrigin, TableScan, TableSource};

pub const PDF_HEADER_KEYWORDS: &[&str] = &["asset", "transaction", "description", "security"];

/// Sub-lines House reports print under an asset: filing status, subholding,
/// description, comments and location.
pub const ANNOTATION_PREFIXES: [&str; 5] = ["F S:", "S O:", "D:", "C:", "L:"];

/// Column names of tables rebuilt from free text.
pub const FALLBACK_HEADER: [&str; 6] = [
    "Owner",
    "Asset",
    "Transaction Type",
    "Date",
    "Notification Date",
    "Amount",
];

static TRADE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(?P<owner>SP|JT|DC)\s+)?",
        r"(?P<asset>.+?)\s+",
        r"(?P<kind>(?i:purchase|exchange|sale(?:\s*\((?:full|partial)\))?|[pse](?:\s*\((?:full|partial)\))?))\s+",
        r"(?P<date>\d{1,2}/\d{1,2}/\d{2,4})",
        r"(?:\s+(?P<notified>\d{1,2}/\d{1,2}/\d{2,4}))?\s+",
        r"(?P<amount>(?:(?i:over)\s+)?\$.*)$",
    ))
    .expect("trade line pattern must compile")
});

/// Locates trade tables in House PDF reports.
#[derive(Debug, Clone, Copy)]
pub struct PdfTableSource {
    text_fallback: bool,
}

impl Default for PdfTableSource {
    fn default() -> Self {
        Self { text_fallback: true }
    }
}

impl PdfTableSource {
    pub fn new(text_fallback: bool) -> Self {
        Self { text_fallback }
    }

    pub fn text_fallback(&self) -> bool {
        self.text_fallback
    }

    pub fn locate_in_pdf(&self, bytes: &[u8]) -> Result<TableScan, ParseError> {
        let document = lopdf::Document::load_mem(bytes)?;
        let mut scan = TableScan::default();

        for (page, page_id) in document.get_pages() {
            let index = scan.tables.len();

            if let Some(table) = layout_table(&document, page, page_id, index) {
                scan.tables.push(table);
                continue;
            }

            if !self.text_fallback {
                debug!(page, "no structured table on page");
                scan.pages_without_tables.push(page);
                continue;
            }

            let text = document.extract_text(&[page]).unwrap_or_default();
            if text.trim().is_empty() {
                warn!(page, "page has no text layer, unsupported");
                scan.pages_without_tables.push(page);
                continue;
            }

            match text_table(&text, page, index) {
                Some(table) => {
                    debug!(page, rows = table.rows.len(), "recovered table from page text");
                    scan.tables.push(table);
                }
                None => scan.pages_without_tables.push(page),
            }
        }

        Ok(scan)
    }
}

impl TableSource for PdfTableSource {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn column_rules(&self) -> &'static ColumnRules {
        &PDF_COLUMN_RULES
    }

    fn locate_tables(&self, document: &Document) -> Result<TableScan, ParseError> {
        match document {
            Document::Pdf(bytes) => self.locate_in_pdf(bytes),
            other => Err(mismatch(DocumentKind::Pdf, other)),
        }
    }
}

fn is_annotation(text: &str) -> bool {
    let text = text.trim_start();
    ANNOTATION_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}

fn is_blank_row(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|cell| cell.trim().is_empty() || cell.trim().eq_ignore_ascii_case("none"))
}

fn layout_table(
    document: &lopdf::Document,
    page: u32,
    page_id: lopdf::ObjectId,
    index: usize,
) -> Option<LocatedTable> {
    let content = document
        .get_page_content(page_id)
        .map_err(|err| warn!(page, error = %err, "unreadable page content"))
        .ok()?;
    let runs = text_runs(&content)
        .map_err(|err| warn!(page, error = %err, "undecodable content stream"))
        .ok()?;

    let lines: Vec<Line> = group_lines(runs)
        .into_iter()
        .filter(|line| !is_annotation(&line.text()))
        .collect();
    let rows = table_rows(&lines)?;

    let Some(header_idx) = find_resolvable_header(&rows, PDF_HEADER_KEYWORDS, &PDF_COLUMN_RULES)
    else {
        debug!(page, "layout rows have no usable header");
        return None;
    };
    let mut table = split_at(index, Some(page), rows, header_idx, TableOrigin::Layout);
    table.rows.retain(|row| !is_blank_row(&row.cells));
    Some(table)
}

/// Rejoin amounts split across lines ("$1,001 -" / "$15,000").
fn joined_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match lines.last_mut() {
            Some(previous) if previous.ends_with('-') && line.starts_with('$') => {
                previous.push(' ');
                previous.push_str(line);
            }
            _ => lines.push(line.to_string()),
        }
    }
    lines
}

fn text_table(text: &str, page: u32, index: usize) -> Option<LocatedTable> {
    let rows: Vec<IndexedRow> = joined_lines(text)
        .iter()
        .filter(|line| !is_annotation(line))
        .filter_map(|line| TRADE_LINE.captures(line))
        .enumerate()
        .map(|(position, captures)| {
            let field = |name: &str| {
                captures
                    .name(name)
                    .map(|found| found.as_str().trim().to_string())
                    .unwrap_or_default()
            };
            IndexedRow {
                index: position,
                cells: vec![
                    field("owner"),
                    field("asset"),
                    field("kind"),
                    field("date"),
                    field("notified"),
                    field("amount"),
                ],
            }
        })
        .filter(|row| !is_placeholder(&row.cells[1]))
        .collect();

    if rows.is_empty() {
        return None;
    }

    Some(LocatedTable {
        index,
        page: Some(page),
        header: FALLBACK_HEADER.iter().map(|cell| cell.to_string()).collect(),
        rows,
        origin: TableOrigin::TextFallback,
    })
}
