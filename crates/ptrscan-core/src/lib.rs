//! Core pipeline for ptrscan.
//!
//! This crate contains:
//! - A retrying on-disk document cache
//! - Table locators for House PDF and Senate HTML reports
//! - Header alias resolution and field normalization
//! - Trade record assembly with provenance and scan counters

pub mod assemble;
pub mod cache;
pub mod columns;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod retry;
pub mod scanner;
pub mod stats;
pub mod table;
pub mod throttling;

pub use assemble::{DisclosureParser, FilingContext, Provenance, TradeAssembler};
pub use cache::{
    cache_key, CacheEntry, CachedDocument, Document, DocumentCache, DocumentKind, FetchOutcome,
};
pub use columns::{
    resolve_columns, ColumnMap, ColumnRules, Field, FieldRule, HeaderMatch, HTML_COLUMN_RULES,
    PDF_COLUMN_RULES,
};
pub use config::ScanConfig;
pub use domain::{
    AmountBucket, AmountRange, Chamber, Ticker, TradeRecord, TransactionType, NOT_DISCLOSED,
    TICKER_STOPWORDS,
};
pub use error::{ConfigError, ParseError, RowError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient, SessionAuth,
    SessionClient,
};
pub use normalize::{Normalizer, TickerChain, TickerStrategy};
pub use retry::{Backoff, RetryConfig};
pub use scanner::{DisclosureScanner, ScanResult};
pub use stats::{ScanStats, StatsSnapshot};
pub use table::{
    HtmlTableSource, IndexedRow, LocatedTable, PdfTableSource, TableOrigin, TableScan, TableSource,
};
pub use throttling::RequestPacer;
