//! Field normalization: raw cell text to canonical typed values.
//!
//! | Field | Module | Output |
//! |-------|--------|--------|
//! | ticker | [`ticker`] | [`Ticker`] via an ordered strategy chain |
//! | transaction type | [`transaction`] | [`TransactionType`] |
//! | amount | [`amount`] | [`AmountRange`] |
//! | dates | [`date`] | [`chrono::NaiveDate`] |
//!
//! The lookup tables are constants owned by each submodule; [`Normalizer`]
//! only binds them to a source chamber.

pub mod amount;
pub mod date;
pub mod ticker;
pub mod transaction;

use chrono::NaiveDate;

use crate::domain::{AmountRange, Chamber, TransactionType};
use crate::Ticker;

pub use amount::normalize_amount;
pub use date::parse_date;
pub use ticker::{RegexStrategy, TickerChain, TickerStrategy};
pub use transaction::normalize_transaction_type;

/// Cell values treated as "nothing here".
pub const PLACEHOLDERS: [&str; 5] = ["", "none", "n/a", "na", "--"];

/// Shortest asset description kept.
pub const MIN_ASSET_LEN: usize = 3;

/// Replace non-breaking spaces, drop control characters and collapse runs of
/// whitespace to a single space.
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '\u{a0}' { ' ' } else { c })
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_placeholder(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    PLACEHOLDERS.contains(&lowered.as_str())
}

/// Cleaned asset description, or `None` when too short or a placeholder.
pub fn clean_asset(raw: &str) -> Option<String> {
    let cleaned = clean_text(raw);
    if cleaned.chars().count() < MIN_ASSET_LEN || is_placeholder(&cleaned) {
        return None;
    }
    Some(cleaned)
}

/// Shared normalizer for both source formats.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tickers: TickerChain,
}

impl Normalizer {
    pub fn for_chamber(chamber: Chamber) -> Self {
        Self {
            tickers: TickerChain::for_chamber(chamber),
        }
    }

    pub fn with_ticker_chain(tickers: TickerChain) -> Self {
        Self { tickers }
    }

    pub fn ticker_chain(&self) -> &TickerChain {
        &self.tickers
    }

    /// Ticker from the dedicated column when it holds a valid symbol,
    /// otherwise extracted from the asset text.
    pub fn ticker(&self, column_value: Option<&str>, asset: &str) -> Option<Ticker> {
        if let Some(value) = column_value {
            let value = clean_text(value).to_uppercase();
            if !is_placeholder(&value) {
                if let Ok(ticker) = Ticker::parse(&value) {
                    return Some(ticker);
                }
            }
        }
        self.tickers.extract(asset)
    }

    pub fn transaction_type(&self, raw: &str) -> TransactionType {
        normalize_transaction_type(raw)
    }

    pub fn amount(&self, raw: &str) -> AmountRange {
        normalize_amount(raw)
    }

    pub fn date(&self, raw: &str) -> Option<NaiveDate> {
        parse_date(raw)
    }
}
