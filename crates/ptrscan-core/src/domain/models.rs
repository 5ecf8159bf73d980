use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{DocumentKind, Ticker, ValidationError};

/// Legislative chamber a filer belongs to. Determines the source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    /// House reports are PDFs, Senate reports are HTML pages.
    pub const fn document_kind(self) -> DocumentKind {
        match self {
            Self::House => DocumentKind::Pdf,
            Self::Senate => DocumentKind::Html,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Senate => "Senate",
        }
    }
}

impl Display for Chamber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chamber {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "house" => Ok(Self::House),
            "senate" => Ok(Self::Senate),
            _ => Err(ValidationError::InvalidChamber {
                value: value.to_string(),
            }),
        }
    }
}

/// Canonical transaction direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Purchase,
    Sale,
    Exchange,
    Unknown,
}

impl TransactionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Sale => "sale",
            Self::Exchange => "exchange",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statutory disclosure brackets reported instead of exact amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmountBucket {
    From1KTo15K,
    From15KTo50K,
    From50KTo100K,
    From100KTo250K,
    From250KTo500K,
    From500KTo1M,
    Over1M,
    Over50M,
}

impl AmountBucket {
    pub const ALL: [Self; 8] = [
        Self::From1KTo15K,
        Self::From15KTo50K,
        Self::From50KTo100K,
        Self::From100KTo250K,
        Self::From250KTo500K,
        Self::From500KTo1M,
        Self::Over1M,
        Self::Over50M,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::From1KTo15K => "$1,001 - $15,000",
            Self::From15KTo50K => "$15,001 - $50,000",
            Self::From50KTo100K => "$50,001 - $100,000",
            Self::From100KTo250K => "$100,001 - $250,000",
            Self::From250KTo500K => "$250,001 - $500,000",
            Self::From500KTo1M => "$500,001 - $1,000,000",
            Self::Over1M => "Over $1,000,000",
            Self::Over50M => "Over $50,000,000",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.label() == label)
    }
}

pub const NOT_DISCLOSED: &str = "Not disclosed";

/// Normalized amount column: a bucket, an explicit non-disclosure, or the
/// source text when it follows no known bracket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AmountRange {
    Bucket(AmountBucket),
    NotDisclosed,
    Raw(String),
}

impl AmountRange {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bucket(bucket) => bucket.label(),
            Self::NotDisclosed => NOT_DISCLOSED,
            Self::Raw(text) => text,
        }
    }
}

impl Display for AmountRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AmountRange {
    fn from(value: String) -> Self {
        if value == NOT_DISCLOSED {
            return Self::NotDisclosed;
        }
        match AmountBucket::from_label(&value) {
            Some(bucket) => Self::Bucket(bucket),
            None => Self::Raw(value),
        }
    }
}

impl From<AmountRange> for String {
    fn from(value: AmountRange) -> Self {
        match value {
            AmountRange::Raw(text) => text,
            other => other.as_str().to_string(),
        }
    }
}

/// One disclosed trade extracted from a filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub member_name: String,
    pub chamber: Chamber,
    pub asset_description: String,
    pub ticker: Option<Ticker>,
    pub owner: Option<String>,
    pub transaction_type: TransactionType,
    pub transaction_date: Option<NaiveDate>,
    pub disclosure_date: Option<NaiveDate>,
    pub amount_range: AmountRange,
    pub filing_url: String,
    pub source_table_index: usize,
    pub source_row_index: usize,
    pub source_page: Option<u32>,
}
