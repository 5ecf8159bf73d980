use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::cache::{Document, DocumentKind};
use crate::columns::{ColumnRules, HTML_COLUMN_RULES};
use crate::error::ParseError;
use crate::normalize::clean_text;

use super::{find_header_row, mismatch, split_at, LocatedTable, TableOrigin, TableScan, TableSource};

/// Words whose presence marks a `<table>` as a transaction table.
pub const TABLE_KEYWORDS: [&str; 8] = [
    "asset",
    "transaction",
    "type",
    "date",
    "amount",
    "ticker",
    "security",
    "stock",
];

/// Minimum number of distinct [`TABLE_KEYWORDS`] a table must contain.
pub const TABLE_KEYWORD_THRESHOLD: usize = 2;

pub const HTML_HEADER_KEYWORDS: &[&str] =
    &["asset", "transaction", "description", "security", "type"];

/// Rows with fewer cells are layout filler, not trades.
const MIN_ROW_CELLS: usize = 2;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid table selector"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid row selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("valid cell selector"));

/// Locates transaction tables in Senate report pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTableSource;

impl HtmlTableSource {
    pub fn new() -> Self {
        Self
    }

    /// Whether the table's flattened text hits enough indicator keywords.
    pub fn is_transaction_table(text: &str) -> bool {
        let lowered = text.to_lowercase();
        TABLE_KEYWORDS
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .count()
            >= TABLE_KEYWORD_THRESHOLD
    }

    pub fn locate_in_html(&self, html: &str) -> TableScan {
        let document = Html::parse_document(html);
        let mut scan = TableScan::default();

        for (index, table) in document.select(&TABLE_SELECTOR).enumerate() {
            let text = table.text().collect::<Vec<_>>().join(" ");
            if !Self::is_transaction_table(&text) {
                debug!(table = index, "skipping non-transaction table");
                scan.skipped += 1;
                continue;
            }

            let rows: Vec<Vec<String>> = table.select(&ROW_SELECTOR).map(row_cells).collect();

            match find_header_row(&rows, HTML_HEADER_KEYWORDS) {
                Some(header_idx) => {
                    let located = split_at(index, None, rows, header_idx, TableOrigin::Markup);
                    scan.tables.push(drop_thin_rows(located));
                }
                None => {
                    debug!(table = index, "no header row in leading rows");
                    scan.skipped += 1;
                }
            }
        }

        scan
    }
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SELECTOR)
        .map(|cell| clean_text(&cell.text().collect::<Vec<_>>().join(" ")))
        .collect()
}

fn drop_thin_rows(mut table: LocatedTable) -> LocatedTable {
    table.rows.retain(|row| row.cells.len() >= MIN_ROW_CELLS);
    table
}

impl TableSource for HtmlTableSource {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Html
    }

    fn column_rules(&self) -> &'static ColumnRules {
        &HTML_COLUMN_RULES
    }

    fn locate_tables(&self, document: &Document) -> Result<TableScan, ParseError> {
        match document {
            Document::Html(html) => Ok(self.locate_in_html(html)),
            other => Err(mismatch(DocumentKind::Html, other)),
        }
    }
}
