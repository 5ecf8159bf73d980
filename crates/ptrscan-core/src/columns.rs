//! Header alias matching: canonical fields to column positions.

use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Canonical fields a trade table may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Asset,
    Ticker,
    Type,
    Date,
    Amount,
    Owner,
    DisclosureDate,
}

impl Field {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Ticker => "ticker",
            Self::Type => "type",
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Owner => "owner",
            Self::DisclosureDate => "disclosure_date",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a header cell is compared with an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    Substring,
    Exact,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub aliases: &'static [&'static str],
    pub matching: HeaderMatch,
}

impl FieldRule {
    const fn substring(field: Field, aliases: &'static [&'static str]) -> Self {
        Self {
            field,
            aliases,
            matching: HeaderMatch::Substring,
        }
    }

    const fn exact(field: Field, aliases: &'static [&'static str]) -> Self {
        Self {
            field,
            aliases,
            matching: HeaderMatch::Exact,
        }
    }

    /// `header` must already be lowercased and whitespace-collapsed.
    fn matches(&self, header: &str) -> bool {
        self.aliases.iter().any(|alias| match self.matching {
            HeaderMatch::Substring => header.contains(alias),
            HeaderMatch::Exact => header == *alias,
        })
    }
}

/// Per-source resolution rules.
pub type ColumnRules = [FieldRule; 7];

const DATE_ALIASES: &[&str] = &["transaction date", "date", "trans date"];
const AMOUNT_ALIASES: &[&str] = &["amount", "value", "cap gains"];
const DISCLOSURE_ALIASES: &[&str] = &[
    "notification date",
    "disclosure date",
    "date notified",
    "filing date",
];

/// HTML pages use a separate "Transaction Type" concept elsewhere on the
/// page, so the type column only matches a header that is exactly `type`.
pub const HTML_COLUMN_RULES: ColumnRules = [
    FieldRule::substring(
        Field::Asset,
        &["asset name", "asset", "description", "security", "stock"],
    ),
    FieldRule::substring(Field::Ticker, &["ticker", "symbol"]),
    FieldRule::substring(Field::DisclosureDate, DISCLOSURE_ALIASES),
    FieldRule::substring(Field::Date, DATE_ALIASES),
    FieldRule::exact(Field::Type, &["type"]),
    FieldRule::substring(Field::Amount, AMOUNT_ALIASES),
    FieldRule::substring(Field::Owner, &["owner"]),
];

pub const PDF_COLUMN_RULES: ColumnRules = [
    FieldRule::substring(Field::Asset, &["asset", "description", "security"]),
    FieldRule::substring(Field::Ticker, &["ticker", "symbol"]),
    FieldRule::substring(Field::DisclosureDate, DISCLOSURE_ALIASES),
    FieldRule::substring(Field::Date, DATE_ALIASES),
    FieldRule::substring(Field::Type, &["type", "transaction"]),
    FieldRule::substring(Field::Amount, AMOUNT_ALIASES),
    FieldRule::substring(Field::Owner, &["owner"]),
];

/// Resolved column positions. Only `asset` is guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub asset: usize,
    pub ticker: Option<usize>,
    pub transaction_type: Option<usize>,
    pub date: Option<usize>,
    pub amount: Option<usize>,
    pub owner: Option<usize>,
    pub disclosure_date: Option<usize>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Asset => Some(self.asset),
            Field::Ticker => self.ticker,
            Field::Type => self.transaction_type,
            Field::Date => self.date,
            Field::Amount => self.amount,
            Field::Owner => self.owner,
            Field::DisclosureDate => self.disclosure_date,
        }
    }
}

pub fn normalize_header(cell: &str) -> String {
    cell.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map each field to the first header cell matching one of its aliases.
///
/// Rules are applied in order and a column claimed by an earlier rule is not
/// offered to later ones: "Notification Date" is never taken as the
/// transaction date, and "Transaction Date" is never taken as the PDF type
/// column. Returns `None` when no asset column exists.
pub fn resolve_columns<S: AsRef<str>>(header: &[S], rules: &ColumnRules) -> Option<ColumnMap> {
    let headers: Vec<String> = header
        .iter()
        .map(|cell| normalize_header(cell.as_ref()))
        .collect();
    let mut claimed = vec![false; headers.len()];
    let mut found = [None; 7];

    for (slot, rule) in found.iter_mut().zip(rules) {
        let position = headers
            .iter()
            .enumerate()
            .position(|(idx, cell)| !claimed[idx] && rule.matches(cell));
        if let Some(idx) = position {
            claimed[idx] = true;
            *slot = Some((rule.field, idx));
        }
    }

    let lookup = |field: Field| {
        found
            .iter()
            .flatten()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, idx)| *idx)
    };

    Some(ColumnMap {
        asset: lookup(Field::Asset)?,
        ticker: lookup(Field::Ticker),
        transaction_type: lookup(Field::Type),
        date: lookup(Field::Date),
        amount: lookup(Field::Amount),
        owner: lookup(Field::Owner),
        disclosure_date: lookup(Field::DisclosureDate),
    })
}
