//! # Table Location
//!
//! Adapters that turn a fetched [`Document`] into header/row tables.
//!
//! | Adapter | Source | Strategy |
//! |---------|--------|----------|
//! | [`HtmlTableSource`] | Senate HTML pages | `<table>` elements scored by keyword hits |
//! | [`PdfTableSource`] | House PDF reports | content-stream geometry, text-line fallback |
//!
//! Both adapters emit the same [`LocatedTable`] shape so column resolution
//! and normalization are shared.

mod html;
pub mod layout;
mod pdf;

use serde::Serialize;

use crate::cache::{Document, DocumentKind};
use crate::columns::{resolve_columns, ColumnRules};
use crate::error::ParseError;

pub use html::{HtmlTableSource, HTML_HEADER_KEYWORDS, TABLE_KEYWORDS, TABLE_KEYWORD_THRESHOLD};
pub use pdf::{PdfTableSource, ANNOTATION_PREFIXES, PDF_HEADER_KEYWORDS};

/// Only this many leading rows are searched for a header.
pub const HEADER_SEARCH_ROWS: usize = 5;

/// How a table was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrigin {
    Markup,
    Layout,
    TextFallback,
}

/// A data row with its position among the table's data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedRow {
    pub index: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedTable {
    /// Position of the table within the document.
    pub index: usize,
    /// 1-based page for PDF tables.
    pub page: Option<u32>,
    pub header: Vec<String>,
    pub rows: Vec<IndexedRow>,
    pub origin: TableOrigin,
}

/// Everything found in one document, plus what was passed over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableScan {
    pub tables: Vec<LocatedTable>,
    /// Candidates rejected by the classifier or lacking a header row.
    pub skipped: usize,
    /// PDF pages that produced neither a layout nor a fallback table.
    pub pages_without_tables: Vec<u32>,
}

/// A source-format adapter.
pub trait TableSource: Send + Sync {
    fn kind(&self) -> DocumentKind;

    /// Column resolution rules for this source.
    fn column_rules(&self) -> &'static ColumnRules;

    fn locate_tables(&self, document: &Document) -> Result<TableScan, ParseError>;
}

fn has_keyword(row: &[String], keywords: &[&str]) -> bool {
    let text = row.join(" ").to_lowercase();
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Index of the first of the leading rows whose text contains a keyword.
pub fn find_header_row(rows: &[Vec<String>], keywords: &[&str]) -> Option<usize> {
    rows.iter()
        .take(HEADER_SEARCH_ROWS)
        .position(|row| has_keyword(row, keywords))
}

/// Like [`find_header_row`], but passes over keyword rows that yield no
/// asset column, such as a report title above the real header.
pub fn find_resolvable_header(
    rows: &[Vec<String>],
    keywords: &[&str],
    rules: &ColumnRules,
) -> Option<usize> {
    rows.iter()
        .take(HEADER_SEARCH_ROWS)
        .position(|row| has_keyword(row, keywords) && resolve_columns(row, rules).is_some())
}

/// Split raw rows at `header_idx`; rows above the header are discarded.
pub(crate) fn split_at(
    index: usize,
    page: Option<u32>,
    mut rows: Vec<Vec<String>>,
    header_idx: usize,
    origin: TableOrigin,
) -> LocatedTable {
    let data = rows.split_off(header_idx + 1);
    let header = rows.pop().unwrap_or_default();

    LocatedTable {
        index,
        page,
        header,
        rows: data
            .into_iter()
            .enumerate()
            .map(|(index, cells)| IndexedRow { index, cells })
            .collect(),
        origin,
    }
}

pub(crate) fn mismatch(expected: DocumentKind, document: &Document) -> ParseError {
    ParseError::KindMismatch {
        expected: expected.as_str(),
        actual: document.kind().as_str(),
    }
}
