use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 5;

/// Tokens that look like tickers in asset text but never are.
pub const TICKER_STOPWORDS: [&str; 10] = [
    "INC", "LLC", "CORP", "LTD", "CO", "THE", "AND", "FOR", "ETF", "LP",
];

/// Exchange ticker extracted from disclosure text.
///
/// Only 1-5 uppercase ASCII letters outside [`TICKER_STOPWORDS`] are accepted,
/// so holding a `Ticker` means the value passed the full gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Validate an already-uppercase candidate.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let len = trimmed.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::TickerLength {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        if !trimmed.chars().all(|ch| ch.is_ascii_uppercase()) {
            return Err(ValidationError::TickerInvalidChars {
                value: trimmed.to_string(),
            });
        }

        if TICKER_STOPWORDS.contains(&trimmed) {
            return Err(ValidationError::TickerStopword {
                value: trimmed.to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}
