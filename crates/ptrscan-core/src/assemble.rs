//! Row extraction and per-document orchestration.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::cache::{Document, DocumentKind};
use crate::columns::{resolve_columns, ColumnMap, ColumnRules};
use crate::config::ScanConfig;
use crate::domain::{Chamber, TradeRecord};
use crate::error::RowError;
use crate::normalize::{clean_asset, clean_text, is_placeholder, Normalizer};
use crate::stats::ScanStats;
use crate::table::{HtmlTableSource, LocatedTable, PdfTableSource, TableOrigin, TableSource};

/// Caller-supplied metadata for one filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingContext {
    pub member_name: String,
    pub chamber: Chamber,
    pub filing_url: String,
    /// Used when the table has no disclosure date column.
    #[serde(default)]
    pub default_disclosure_date: Option<NaiveDate>,
}

impl FilingContext {
    pub fn new(member_name: impl Into<String>, chamber: Chamber, filing_url: impl Into<String>) -> Self {
        Self {
            member_name: member_name.into(),
            chamber,
            filing_url: filing_url.into(),
            default_disclosure_date: None,
        }
    }

    pub fn with_disclosure_date(mut self, date: NaiveDate) -> Self {
        self.default_disclosure_date = Some(date);
        self
    }
}

/// Where a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub table: usize,
    pub row: usize,
    pub page: Option<u32>,
}

/// Turns resolved rows into [`TradeRecord`] values.
#[derive(Debug)]
pub struct TradeAssembler<'a> {
    context: &'a FilingContext,
    normalizer: &'a Normalizer,
}

impl<'a> TradeAssembler<'a> {
    pub fn new(context: &'a FilingContext, normalizer: &'a Normalizer) -> Self {
        Self {
            context,
            normalizer,
        }
    }

    /// `Ok(None)` when the asset fails validation; that is an expected drop.
    pub fn extract_row(
        &self,
        cells: &[String],
        columns: &ColumnMap,
        provenance: Provenance,
    ) -> Result<Option<TradeRecord>, RowError> {
        let raw_asset = cells.get(columns.asset).ok_or(RowError::MissingAssetCell {
            index: columns.asset,
            len: cells.len(),
        })?;
        let Some(asset) = clean_asset(raw_asset) else {
            return Ok(None);
        };

        let cell = |column: Option<usize>| column.and_then(|idx| cells.get(idx)).map(String::as_str);

        let ticker = self.normalizer.ticker(cell(columns.ticker), &asset);
        let transaction_type = self
            .normalizer
            .transaction_type(cell(columns.transaction_type).unwrap_or_default());
        let transaction_date = cell(columns.date).and_then(|raw| self.normalizer.date(raw));
        let amount_range = self.normalizer.amount(cell(columns.amount).unwrap_or_default());
        let owner = cell(columns.owner)
            .map(clean_text)
            .filter(|owner| !is_placeholder(owner));
        let disclosure_date = cell(columns.disclosure_date)
            .and_then(|raw| self.normalizer.date(raw))
            .or(self.context.default_disclosure_date)
            .or(transaction_date);

        Ok(Some(TradeRecord {
            member_name: self.context.member_name.clone(),
            chamber: self.context.chamber,
            asset_description: asset,
            ticker,
            owner,
            transaction_type,
            transaction_date,
            disclosure_date,
            amount_range,
            filing_url: self.context.filing_url.clone(),
            source_table_index: provenance.table,
            source_row_index: provenance.row,
            source_page: provenance.page,
        }))
    }
}

/// Parses a fetched document into trade records.
///
/// Parsing never fails as a whole: unreadable documents, unusable tables
/// and bad rows are logged, counted and skipped.
#[derive(Debug, Clone)]
pub struct DisclosureParser {
    html: HtmlTableSource,
    pdf: PdfTableSource,
    stats: Arc<ScanStats>,
}

impl Default for DisclosureParser {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DisclosureParser {
    pub fn new(text_fallback: bool) -> Self {
        Self {
            html: HtmlTableSource::new(),
            pdf: PdfTableSource::new(text_fallback),
            stats: Arc::new(ScanStats::new()),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.text_fallback)
    }

    pub fn with_stats(mut self, stats: Arc<ScanStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> &Arc<ScanStats> {
        &self.stats
    }

    pub fn source_for(&self, kind: DocumentKind) -> &dyn TableSource {
        match kind {
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::Html => &self.html,
        }
    }

    pub fn parse_document(&self, document: &Document, context: &FilingContext) -> Vec<TradeRecord> {
        if document.kind() != context.chamber.document_kind() {
            warn!(
                url = %context.filing_url,
                chamber = %context.chamber,
                kind = %document.kind(),
                "document format differs from the chamber's usual source"
            );
        }

        let source = self.source_for(document.kind());
        let scan = match source.locate_tables(document) {
            Ok(scan) => scan,
            Err(err) => {
                error!(url = %context.filing_url, error = %err, "failed to read document");
                self.stats.add_errors(1);
                return Vec::new();
            }
        };

        let fallback_tables = scan
            .tables
            .iter()
            .filter(|table| table.origin == TableOrigin::TextFallback)
            .count();
        self.stats.add_tables_found(scan.tables.len() as u64);
        self.stats.add_tables_skipped(scan.skipped as u64);
        self.stats.add_pages_without_tables(scan.pages_without_tables.len() as u64);
        self.stats.add_text_fallback_tables(fallback_tables as u64);

        let normalizer = Normalizer::for_chamber(context.chamber);
        let assembler = TradeAssembler::new(context, &normalizer);

        let records: Vec<TradeRecord> = scan
            .tables
            .iter()
            .flat_map(|table| self.parse_table(table, source.column_rules(), &assembler))
            .collect();

        info!(
            url = %context.filing_url,
            tables = scan.tables.len(),
            records = records.len(),
            "parsed disclosure"
        );
        records
    }

    fn parse_table(
        &self,
        table: &LocatedTable,
        rules: &ColumnRules,
        assembler: &TradeAssembler<'_>,
    ) -> Vec<TradeRecord> {
        let Some(columns) = resolve_columns(&table.header, rules) else {
            debug!(table = table.index, header = ?table.header, "no asset column, skipping table");
            self.stats.add_tables_skipped(1);
            return Vec::new();
        };
        self.stats.add_tables_parsed(1);

        let mut records = Vec::new();
        for row in &table.rows {
            let provenance = Provenance {
                table: table.index,
                row: row.index,
                page: table.page,
            };
            match assembler.extract_row(&row.cells, &columns, provenance) {
                Ok(Some(record)) => {
                    self.stats.add_rows_extracted(1);
                    records.push(record);
                }
                Ok(None) => self.stats.add_rows_dropped(1),
                Err(err) => {
                    warn!(table = table.index, row = row.index, error = %err, "skipping malformed row");
                    self.stats.add_errors(1);
                }
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::PDF_COLUMN_RULES;
    use crate::domain::{AmountRange, TransactionType};

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn context() -> FilingContext {
        FilingContext::new("Jane Doe", Chamber::House, "https://example.test/20024567.pdf")
    }

    const PROVENANCE: Provenance = Provenance {
        table: 0,
        row: 3,
        page: Some(1),
    };

    #[test]
    fn row_shorter_than_asset_column_is_an_error() {
        let context = context();
        let normalizer = Normalizer::for_chamber(Chamber::House);
        let assembler = TradeAssembler::new(&context, &normalizer);
        let columns = resolve_columns(&["Owner", "Asset"], &PDF_COLUMN_RULES).expect("columns");

        let err = assembler
            .extract_row(&cells(&["SP"]), &columns, PROVENANCE)
            .expect_err("short row");

        assert_eq!(err, RowError::MissingAssetCell { index: 1, len: 1 });
    }

    #[test]
    fn missing_optional_cells_use_defaults() {
        let context = context().with_disclosure_date(NaiveDate::from_ymd_opt(2024, 9, 1).expect("date"));
        let normalizer = Normalizer::for_chamber(Chamber::House);
        let assembler = TradeAssembler::new(&context, &normalizer);
        let columns = resolve_columns(&["Asset", "Type", "Date", "Amount"], &PDF_COLUMN_RULES)
            .expect("columns");

        let record = assembler
            .extract_row(&cells(&["Vanguard Total Bond"]), &columns, PROVENANCE)
            .expect("row")
            .expect("record");

        assert_eq!(record.transaction_type, TransactionType::Unknown);
        assert_eq!(record.amount_range, AmountRange::NotDisclosed);
        assert_eq!(record.transaction_date, None);
        assert_eq!(record.disclosure_date, NaiveDate::from_ymd_opt(2024, 9, 1));
        assert_eq!(record.source_row_index, 3);
        assert_eq!(record.source_page, Some(1));
    }

    #[test]
    fn disclosure_date_falls_back_to_transaction_date() {
        let context = context();
        let normalizer = Normalizer::for_chamber(Chamber::House);
        let assembler = TradeAssembler::new(&context, &normalizer);
        let columns = resolve_columns(&["Asset", "Date"], &PDF_COLUMN_RULES).expect("columns");

        let record = assembler
            .extract_row(&cells(&["Apple Inc", "03/04/2024"]), &columns, PROVENANCE)
            .expect("row")
            .expect("record");

        assert_eq!(record.disclosure_date, NaiveDate::from_ymd_opt(2024, 3, 4));
    }

    #[test]
    fn html_document_routes_to_markup_source() {
        let parser = DisclosureParser::default();
        assert_eq!(parser.source_for(DocumentKind::Html).kind(), DocumentKind::Html);
        assert_eq!(parser.source_for(DocumentKind::Pdf).kind(), DocumentKind::Pdf);
    }

    #[test]
    fn unreadable_pdf_counts_an_error_and_yields_nothing() {
        let parser = DisclosureParser::default();

        let records = parser.parse_document(&Document::Pdf(b"garbage".to_vec()), &context());

        assert!(records.is_empty());
        assert_eq!(parser.stats().snapshot().errors, 1);
    }
}
