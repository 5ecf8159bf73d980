use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters accumulated across fetches and parses. Observability only; they
/// never influence what gets emitted.
#[derive(Debug, Default)]
pub struct ScanStats {
    documents_fetched: AtomicU64,
    cache_hits: AtomicU64,
    fetch_failures: AtomicU64,
    tables_found: AtomicU64,
    tables_parsed: AtomicU64,
    tables_skipped: AtomicU64,
    pages_without_tables: AtomicU64,
    text_fallback_tables: AtomicU64,
    rows_extracted: AtomicU64,
    rows_dropped: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of [`ScanStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub documents_fetched: u64,
    pub cache_hits: u64,
    pub fetch_failures: u64,
    pub tables_found: u64,
    pub tables_parsed: u64,
    pub tables_skipped: u64,
    pub pages_without_tables: u64,
    pub text_fallback_tables: u64,
    pub rows_extracted: u64,
    pub rows_dropped: u64,
    pub errors: u64,
}

macro_rules! counter {
    ($($record:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $record(&self, n: u64) {
                self.$field.fetch_add(n, Ordering::Relaxed);
            }
        )*
    };
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    counter! {
        add_documents_fetched => documents_fetched,
        add_cache_hits => cache_hits,
        add_fetch_failures => fetch_failures,
        add_tables_found => tables_found,
        add_tables_parsed => tables_parsed,
        add_tables_skipped => tables_skipped,
        add_pages_without_tables => pages_without_tables,
        add_text_fallback_tables => text_fallback_tables,
        add_rows_extracted => rows_extracted,
        add_rows_dropped => rows_dropped,
        add_errors => errors,
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            documents_fetched: self.documents_fetched.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            tables_found: self.tables_found.load(Ordering::Relaxed),
            tables_parsed: self.tables_parsed.load(Ordering::Relaxed),
            tables_skipped: self.tables_skipped.load(Ordering::Relaxed),
            pages_without_tables: self.pages_without_tables.load(Ordering::Relaxed),
            text_fallback_tables: self.text_fallback_tables.load(Ordering::Relaxed),
            rows_extracted: self.rows_extracted.load(Ordering::Relaxed),
            rows_dropped: self.rows_dropped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
