use crate::domain::TransactionType;

use super::clean_text;

/// Alias lists per transaction type, checked in order.
pub const TRANSACTION_ALIASES: [(TransactionType, &[&str]); 3] = [
    (
        TransactionType::Purchase,
        &["purchase", "buy", "p", "purchased"],
    ),
    (
        TransactionType::Sale,
        &[
            "sale",
            "sell",
            "s",
            "sold",
            "sale (full)",
            "sale (partial)",
            "sale(full)",
            "sale(partial)",
            "s (full)",
            "s (partial)",
        ],
    ),
    (TransactionType::Exchange, &["exchange", "e", "ex", "exchanged"]),
];

/// Exact alias lookup on the lowercased, whitespace-collapsed text.
pub fn normalize_transaction_type(raw: &str) -> TransactionType {
    let text = clean_text(raw).to_lowercase();

    TRANSACTION_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&text.as_str()))
        .map(|(kind, _)| *kind)
        .unwrap_or(TransactionType::Unknown)
}
