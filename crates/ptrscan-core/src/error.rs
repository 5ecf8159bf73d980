use thiserror::Error;

/// Validation errors raised while building typed values from raw cell text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} outside 1..={max}")]
    TickerLength { len: usize, max: usize },
    #[error("ticker must be uppercase ASCII letters: '{value}'")]
    TickerInvalidChars { value: String },
    #[error("ticker '{value}' is a reserved word")]
    TickerStopword { value: String },

    #[error("invalid chamber '{value}', expected one of house, senate")]
    InvalidChamber { value: String },
}

/// A document that could not be read at all.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("document kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

/// A single data row that could not be turned into a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("row has {len} cells but the asset column is {index}")]
    MissingAssetCell { index: usize, len: usize },
}

/// Errors loading scan configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
