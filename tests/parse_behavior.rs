//! Behavior-driven tests for disclosure parsing
//!
//! These tests verify WHAT records come out of House PDF and Senate HTML
//! reports, and which rows and tables are passed over.

use chrono::NaiveDate;
use ptrscan_core::{
    normalize::{normalize_amount, parse_date},
    resolve_columns, AmountRange, Chamber, DisclosureParser, Document, FilingContext, Normalizer,
    Provenance, TableOrigin, TableSource, TradeAssembler, TransactionType, PDF_COLUMN_RULES,
    TICKER_STOPWORDS,
};
use ptrscan_tests::pdf_with_text;

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn senate_context() -> FilingContext {
    FilingContext::new(
        "John Roe",
        Chamber::Senate,
        "https://efdsearch.senate.gov/search/view/ptr/4f1c7a2e/",
    )
}

fn house_context() -> FilingContext {
    FilingContext::new(
        "Jane Doe",
        Chamber::House,
        "https://disclosures-clerk.house.gov/public_disc/ptr-pdfs/2024/20024567.pdf",
    )
}

fn house_report() -> Vec<u8> {
    pdf_with_text(&[
        (40.0, 740.0, "Periodic Transaction Report"),
        (40.0, 700.0, "Owner"),
        (80.0, 700.0, "Asset"),
        (280.0, 700.0, "Transaction Type"),
        (360.0, 700.0, "Date"),
        (420.0, 700.0, "Notification Date"),
        (510.0, 700.0, "Amount"),
        (80.0, 680.0, "Microsoft Corporation (MSFT) -"),
        (280.0, 680.0, "Purchase"),
        (360.0, 680.0, "08/15/2024"),
        (420.0, 680.0, "08/30/2024"),
        (510.0, 680.0, "$15,001 - $50,000"),
        (80.0, 672.0, "Common Stock"),
        (80.0, 664.0, "F S: New"),
        (40.0, 640.0, "SP"),
        (80.0, 640.0, "Apple Inc. (AAPL) [ST]"),
        (280.0, 640.0, "S (partial)"),
        (360.0, 640.0, "09/03/2024"),
        (420.0, 640.0, "09/20/2024"),
        (510.0, 640.0, "$1,001 - $15,000"),
    ])
}

const SENATE_PAGE: &str = r#"
<html><body>
  <table class="table"><tr><td>Filer Information</td><td>Senator</td></tr></table>
  <table class="table table-striped">
    <thead>
      <tr><th>#</th><th>Transaction Date</th><th>Owner</th><th>Ticker</th>
          <th>Asset Name</th><th>Asset Type</th><th>Type</th><th>Amount</th><th>Comment</th></tr>
    </thead>
    <tbody>
      <tr><td>1</td><td>01/05/2023</td><td>Self</td><td>NVDA</td>
          <td>NVIDIA Corporation</td><td>Stock</td><td>Purchase</td><td>$50,001 - $100,000</td><td>--</td></tr>
      <tr><td>2</td><td>January 9, 2023</td><td>Spouse</td><td>--</td>
          <td>Vanguard Total Stock Market ETF - VTI</td><td>Stock</td><td>Sale (Partial)</td><td>$1,001 - $15,000</td><td>--</td></tr>
      <tr><td>3</td><td>01/11/2023</td><td>Joint</td><td>--</td>
          <td>--</td><td>Stock</td><td>Exchange</td><td>$1,001 - $15,000</td><td>--</td></tr>
    </tbody>
  </table>
</body></html>"#;

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn when_standard_row_is_assembled_then_every_field_is_normalized() {
    // Given: The canonical header and a typical row
    let context = house_context();
    let normalizer = Normalizer::for_chamber(Chamber::House);
    let assembler = TradeAssembler::new(&context, &normalizer);
    let header = ["Asset", "Transaction Type", "Transaction Date", "Amount"];
    let columns = resolve_columns(&header, &PDF_COLUMN_RULES).expect("asset column resolves");
    let row = strings(&[
        "Microsoft Corporation (MSFT) - Common Stock",
        "Purchase",
        "08/15/2024",
        "$15,001 - $50,000",
    ]);

    // When: The row is extracted
    let record = assembler
        .extract_row(&row, &columns, Provenance { table: 0, row: 0, page: None })
        .expect("row is well formed")
        .expect("asset is valid");

    // Then: The record carries canonical values
    assert!(record.asset_description.contains("Microsoft"));
    assert_eq!(record.ticker.as_ref().map(|t| t.as_str()), Some("MSFT"));
    assert_eq!(record.transaction_type, TransactionType::Purchase);
    assert_eq!(record.transaction_date, ymd(2024, 8, 15));
    assert_eq!(record.amount_range.as_str(), "$15,001 - $50,000");

    let json = serde_json::to_value(&record).expect("record serializes");
    assert_eq!(json["transaction_date"], "2024-08-15");
    assert_eq!(json["transaction_type"], "purchase");
    assert_eq!(json["ticker"], "MSFT");
}

// =============================================================================
// Senate HTML
// =============================================================================

#[test]
fn when_senate_page_is_parsed_then_only_valid_rows_become_records() {
    // Given: A Senate report page with a navigation table and a trade table
    let parser = DisclosureParser::default();
    let document = Document::Html(SENATE_PAGE.to_string());

    // When: The page is parsed
    let records = parser.parse_document(&document, &senate_context());

    // Then: The placeholder-asset row is dropped and the rest are normalized
    assert_eq!(records.len(), 2);

    let nvda = &records[0];
    assert_eq!(nvda.ticker.as_ref().map(|t| t.as_str()), Some("NVDA"));
    assert_eq!(nvda.transaction_type, TransactionType::Purchase);
    assert_eq!(nvda.transaction_date, ymd(2023, 1, 5));
    assert_eq!(nvda.owner.as_deref(), Some("Self"));
    assert_eq!(nvda.source_table_index, 1);
    assert_eq!(nvda.source_row_index, 0);

    let vti = &records[1];
    assert_eq!(vti.ticker.as_ref().map(|t| t.as_str()), Some("VTI"));
    assert_eq!(vti.transaction_type, TransactionType::Sale);
    assert_eq!(vti.transaction_date, ymd(2023, 1, 9));
    assert_eq!(vti.disclosure_date, ymd(2023, 1, 9));

    let stats = parser.stats().snapshot();
    assert_eq!(stats.tables_found, 1);
    assert_eq!(stats.tables_skipped, 1);
    assert_eq!(stats.rows_extracted, 2);
    assert_eq!(stats.rows_dropped, 1);
    assert_eq!(stats.errors, 0);
}

#[test]
fn when_table_has_fewer_than_two_keywords_then_it_is_never_selected() {
    // Given: A styled table that mentions only one indicator keyword
    let html = r#"<table class="table table-striped">
        <tr><th>Asset</th><th>Notes</th></tr>
        <tr><td>Apple Inc (AAPL)</td><td>Held in trust</td></tr>
    </table>"#;

    // When: Tables are located
    let scan = DisclosureParser::default()
        .source_for(ptrscan_core::DocumentKind::Html)
        .locate_tables(&Document::Html(html.to_string()))
        .expect("html document");

    // Then: Nothing qualifies
    assert!(scan.tables.is_empty());
    assert_eq!(scan.skipped, 1);
}

#[test]
fn when_asset_cell_is_placeholder_then_no_record_and_no_error() {
    // Given: Rows whose asset cell is empty, a dash placeholder, or N/A
    let html = r#"<table>
        <tr><th>Asset Name</th><th>Type</th><th>Amount</th></tr>
        <tr><td></td><td>Purchase</td><td>$1,001 - $15,000</td></tr>
        <tr><td>--</td><td>Purchase</td><td>$1,001 - $15,000</td></tr>
        <tr><td>N/A</td><td>Sale</td><td>$1,001 - $15,000</td></tr>
    </table>"#;
    let parser = DisclosureParser::default();

    // When: The page is parsed
    let records = parser.parse_document(&Document::Html(html.to_string()), &senate_context());

    // Then: Every row is dropped silently
    assert!(records.is_empty());
    let stats = parser.stats().snapshot();
    assert_eq!(stats.rows_dropped, 3);
    assert_eq!(stats.errors, 0);
}

#[test]
fn when_html_header_says_transaction_type_then_type_column_stays_unresolved() {
    // Given: A Senate table whose type header is not exactly "Type"
    let html = r#"<table>
        <tr><th>Asset</th><th>Transaction Type</th><th>Amount</th></tr>
        <tr><td>Apple Inc (AAPL)</td><td>Purchase</td><td>$1,001 - $15,000</td></tr>
    </table>"#;

    // When: The page is parsed
    let records =
        DisclosureParser::default().parse_document(&Document::Html(html.to_string()), &senate_context());

    // Then: The record exists but its type is unknown
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].transaction_type, TransactionType::Unknown);
}

// =============================================================================
// House PDF
// =============================================================================

#[test]
fn when_house_pdf_is_parsed_then_layout_table_yields_records() {
    // Given: A House report laid out in columns, with a wrapped asset line
    //        and a filing-status annotation
    let parser = DisclosureParser::default();
    let document = Document::Pdf(house_report());

    // When: The report is parsed
    let records = parser.parse_document(&document, &house_context());

    // Then: Both trades are recovered with page provenance
    assert_eq!(records.len(), 2);

    let msft = &records[0];
    assert_eq!(msft.asset_description, "Microsoft Corporation (MSFT) - Common Stock");
    assert_eq!(msft.ticker.as_ref().map(|t| t.as_str()), Some("MSFT"));
    assert_eq!(msft.transaction_type, TransactionType::Purchase);
    assert_eq!(msft.transaction_date, ymd(2024, 8, 15));
    assert_eq!(msft.disclosure_date, ymd(2024, 8, 30));
    assert_eq!(msft.owner, None);
    assert_eq!(msft.source_page, Some(1));
    assert_eq!(msft.source_row_index, 0);

    let aapl = &records[1];
    assert_eq!(aapl.ticker.as_ref().map(|t| t.as_str()), Some("AAPL"));
    assert_eq!(aapl.transaction_type, TransactionType::Sale);
    assert_eq!(aapl.owner.as_deref(), Some("SP"));
    assert_eq!(aapl.amount_range.as_str(), "$1,001 - $15,000");
    assert!(!aapl.asset_description.contains("F S:"));
    assert!(!msft.asset_description.contains("F S:"));
}

#[test]
fn when_house_pdf_has_layout_table_then_origin_is_layout() {
    // Given: The House fixture
    let document = Document::Pdf(house_report());

    // When: Tables are located
    let scan = DisclosureParser::default()
        .source_for(ptrscan_core::DocumentKind::Pdf)
        .locate_tables(&document)
        .expect("pdf loads");

    // Then: One layout table on page one, no fallback needed
    assert_eq!(scan.tables.len(), 1);
    assert_eq!(scan.tables[0].origin, TableOrigin::Layout);
    assert_eq!(scan.tables[0].page, Some(1));
    assert!(scan.pages_without_tables.is_empty());
}

#[test]
fn when_asset_wraps_in_first_column_then_continuation_joins_the_trade() {
    // Given: A report whose asset column is the leftmost one and wraps
    let document = Document::Pdf(pdf_with_text(&[
        (40.0, 700.0, "Asset"),
        (280.0, 700.0, "Transaction Type"),
        (360.0, 700.0, "Transaction Date"),
        (480.0, 700.0, "Amount"),
        (40.0, 680.0, "Microsoft Corporation (MSFT) -"),
        (280.0, 680.0, "Purchase"),
        (360.0, 680.0, "08/15/2024"),
        (480.0, 680.0, "$15,001 - $50,000"),
        (40.0, 672.0, "Common Stock"),
        (40.0, 640.0, "Apple Inc. (AAPL)"),
        (280.0, 640.0, "Sale"),
        (360.0, 640.0, "09/03/2024"),
        (480.0, 640.0, "$1,001 - $15,000"),
    ]));
    let parser = DisclosureParser::default();

    // When: The report is parsed
    let records = parser.parse_document(&document, &house_context());

    // Then: The wrapped text stays with its trade instead of becoming a row
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].asset_description, "Microsoft Corporation (MSFT) - Common Stock");
    assert_eq!(records[0].ticker.as_ref().map(|t| t.as_str()), Some("MSFT"));
    assert_eq!(records[0].transaction_type, TransactionType::Purchase);
    assert_eq!(records[1].ticker.as_ref().map(|t| t.as_str()), Some("AAPL"));
    assert_eq!(records[1].source_row_index, 1);
    assert_eq!(parser.stats().snapshot().rows_dropped, 0);
}

#[test]
fn when_title_line_mentions_transaction_then_real_header_is_still_found() {
    // Given: A two-part report title above the column header
    let document = Document::Pdf(pdf_with_text(&[
        (40.0, 740.0, "Periodic Transaction Report"),
        (420.0, 740.0, "Filing ID #20024567"),
        (40.0, 700.0, "Asset"),
        (280.0, 700.0, "Transaction Type"),
        (360.0, 700.0, "Transaction Date"),
        (480.0, 700.0, "Amount"),
        (40.0, 680.0, "Tesla Inc (TSLA)"),
        (280.0, 680.0, "Purchase"),
        (360.0, 680.0, "02/14/2024"),
        (480.0, 680.0, "$1,001 - $15,000"),
    ]));
    let parser = DisclosureParser::default();

    // When: The report is parsed
    let records = parser.parse_document(&document, &house_context());

    // Then: The title is passed over and the trade row is kept
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ticker.as_ref().map(|t| t.as_str()), Some("TSLA"));
    assert_eq!(records[0].transaction_date, ymd(2024, 2, 14));

    let stats = parser.stats().snapshot();
    assert_eq!(stats.tables_parsed, 1);
    assert_eq!(stats.tables_skipped, 0);
    assert_eq!(stats.text_fallback_tables, 0);
}

fn house_text_report() -> Vec<u8> {
    pdf_with_text(&[
        (40.0, 740.0, "Periodic Transaction Report"),
        (
            40.0,
            700.0,
            "SP Apple Inc. (AAPL) [ST] P 01/02/2024 01/10/2024 $1,001 - $15,000",
        ),
        (40.0, 680.0, "F S: New"),
        (
            40.0,
            660.0,
            "JT Exxon Mobil Corp (XOM) [ST] E 02/03/2024 02/20/2024 $15,001 - $50,000",
        ),
    ])
}

#[test]
fn when_house_pdf_has_only_text_lines_then_fallback_table_is_built() {
    // Given: A report whose trades are single text lines without columns
    let document = Document::Pdf(house_text_report());

    // When: Tables are located
    let scan = DisclosureParser::default()
        .source_for(ptrscan_core::DocumentKind::Pdf)
        .locate_tables(&document)
        .expect("pdf loads");

    // Then: One table is recovered from the page text
    assert_eq!(scan.tables.len(), 1);
    assert_eq!(scan.tables[0].origin, TableOrigin::TextFallback);
    assert_eq!(scan.tables[0].page, Some(1));
    assert_eq!(scan.tables[0].rows.len(), 2);
    assert!(scan.pages_without_tables.is_empty());
}

#[test]
fn when_text_fallback_table_is_parsed_then_trade_lines_become_records() {
    // Given: The single-line House report
    let parser = DisclosureParser::default();
    let document = Document::Pdf(house_text_report());

    // When: The report is parsed
    let records = parser.parse_document(&document, &house_context());

    // Then: Both trade lines are normalized, including the exchange code
    assert_eq!(records.len(), 2);

    let aapl = &records[0];
    assert_eq!(aapl.ticker.as_ref().map(|t| t.as_str()), Some("AAPL"));
    assert_eq!(aapl.owner.as_deref(), Some("SP"));
    assert_eq!(aapl.transaction_type, TransactionType::Purchase);
    assert_eq!(aapl.transaction_date, ymd(2024, 1, 2));
    assert_eq!(aapl.disclosure_date, ymd(2024, 1, 10));

    let xom = &records[1];
    assert_eq!(xom.ticker.as_ref().map(|t| t.as_str()), Some("XOM"));
    assert_eq!(xom.owner.as_deref(), Some("JT"));
    assert_eq!(xom.transaction_type, TransactionType::Exchange);
    assert_eq!(xom.amount_range.as_str(), "$15,001 - $50,000");

    assert_eq!(parser.stats().snapshot().text_fallback_tables, 1);
}

#[test]
fn when_pdf_page_has_no_table_and_fallback_disabled_then_page_is_reported() {
    // Given: A single-column page and a parser without text fallback
    let document = Document::Pdf(pdf_with_text(&[
        (72.0, 720.0, "Clerk of the House of Representatives"),
        (72.0, 700.0, "No transactions to report"),
    ]));
    let parser = DisclosureParser::new(false);

    // When: The report is parsed
    let records = parser.parse_document(&document, &house_context());

    // Then: No records, and the page is counted
    assert!(records.is_empty());
    assert_eq!(parser.stats().snapshot().pages_without_tables, 1);
}

#[test]
fn when_pdf_bytes_are_handed_html_source_then_document_is_skipped() {
    // Given: A Senate context but PDF bytes that cannot be read
    let parser = DisclosureParser::default();

    // When: The document is parsed
    let records = parser.parse_document(&Document::Pdf(b"%PDF-broken".to_vec()), &senate_context());

    // Then: Nothing is emitted and the failure is counted
    assert!(records.is_empty());
    assert_eq!(parser.stats().snapshot().errors, 1);
}

// =============================================================================
// Normalization properties
// =============================================================================

#[test]
fn when_amount_uses_to_instead_of_dash_then_canonical_label_is_returned() {
    assert_eq!(normalize_amount("$15,001 to $50,000").as_str(), "$15,001 - $50,000");
    assert_eq!(normalize_amount("--"), AmountRange::NotDisclosed);
}

#[test]
fn when_dates_are_spelled_differently_then_they_resolve_to_the_same_day() {
    for raw in ["January 5, 2023", "01/05/2023", "2023-01-05"] {
        assert_eq!(parse_date(raw), ymd(2023, 1, 5), "raw={raw}");
    }
}

#[test]
fn when_asset_text_contains_only_stopwords_then_no_ticker_is_returned() {
    let normalizer = Normalizer::for_chamber(Chamber::Senate);

    for word in TICKER_STOPWORDS {
        let text = format!("Holding ({word}) - {word}");
        let ticker = normalizer.ticker(Some(word), &text);
        assert!(ticker.is_none(), "stopword {word} leaked as ticker");
    }
}
