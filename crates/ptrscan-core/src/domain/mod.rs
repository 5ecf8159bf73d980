//! # Domain Models
//!
//! Typed values produced by the parser.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TradeRecord`] | One disclosed trade with provenance |
//! | [`Chamber`] | House (PDF) or Senate (HTML) |
//! | [`TransactionType`] | purchase, sale, exchange, unknown |
//! | [`AmountRange`] | Canonical bracket, `Not disclosed`, or raw text |
//! | [`Ticker`] | Validated 1-5 letter symbol |
//!
//! Every record is built once by the assembler and never mutated afterwards.

mod models;
mod ticker;

pub use models::{
    AmountBucket, AmountRange, Chamber, TradeRecord, TransactionType, NOT_DISCLOSED,
};
pub use ticker::{Ticker, TICKER_STOPWORDS};
