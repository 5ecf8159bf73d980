use std::sync::Arc;

use tracing::warn;

use crate::assemble::{DisclosureParser, FilingContext};
use crate::cache::{CacheEntry, DocumentCache};
use crate::config::ScanConfig;
use crate::domain::TradeRecord;
use crate::http_client::HttpClient;
use crate::stats::{ScanStats, StatsSnapshot};

/// Records and cache bookkeeping for one filing.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub entry: CacheEntry,
    pub records: Vec<TradeRecord>,
}

/// Fetch-then-parse pipeline for one filing at a time.
///
/// The cache and parser share one [`ScanStats`].
#[derive(Debug)]
pub struct DisclosureScanner {
    cache: DocumentCache,
    parser: DisclosureParser,
    stats: Arc<ScanStats>,
}

impl DisclosureScanner {
    pub fn new(cache: DocumentCache, parser: DisclosureParser) -> Self {
        let stats = Arc::new(ScanStats::new());
        Self {
            cache: cache.with_stats(stats.clone()),
            parser: parser.with_stats(stats.clone()),
            stats,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            DocumentCache::from_config(config),
            DisclosureParser::from_config(config),
        )
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn parser(&self) -> &DisclosureParser {
        &self.parser
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Fetch the filing and parse it. A failed fetch yields no records.
    pub async fn scan(
        &self,
        context: &FilingContext,
        session: Option<&dyn HttpClient>,
    ) -> ScanResult {
        let fetched = self
            .cache
            .fetch_entry(&context.filing_url, context.chamber.document_kind(), session)
            .await;

        let records = match &fetched.document {
            Some(document) => self.parser.parse_document(document, context),
            None => {
                warn!(url = %context.filing_url, member = %context.member_name, "skipping unavailable filing");
                Vec::new()
            }
        };

        ScanResult {
            entry: fetched.entry,
            records,
        }
    }

    /// [`scan`](Self::scan) without the cache entry.
    pub async fn scan_records(
        &self,
        context: &FilingContext,
        session: Option<&dyn HttpClient>,
    ) -> Vec<TradeRecord> {
        self.scan(context, session).await.records
    }
}
