use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::domain::{AmountBucket, AmountRange};

use super::{clean_text, is_placeholder};

/// Bracket patterns in evaluation order, matched case-insensitively.
pub const AMOUNT_PATTERNS: [(&str, AmountBucket); 8] = [
    (r"\$1,001.*?\$15,000", AmountBucket::From1KTo15K),
    (r"\$15,001.*?\$50,000", AmountBucket::From15KTo50K),
    (r"\$50,001.*?\$100,000", AmountBucket::From50KTo100K),
    (r"\$100,001.*?\$250,000", AmountBucket::From100KTo250K),
    (r"\$250,001.*?\$500,000", AmountBucket::From250KTo500K),
    (r"\$500,001.*?\$1,000,000", AmountBucket::From500KTo1M),
    (r"over.*?\$1,000,000", AmountBucket::Over1M),
    (r"over.*?\$50,000,000", AmountBucket::Over50M),
];

static COMPILED: LazyLock<Vec<(Regex, AmountBucket)>> = LazyLock::new(|| {
    AMOUNT_PATTERNS
        .iter()
        .map(|(pattern, bucket)| {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("amount pattern must compile");
            (regex, *bucket)
        })
        .collect()
});

/// Map raw amount text onto a statutory bracket.
///
/// Blank and placeholder text is [`AmountRange::NotDisclosed`]; text matching
/// no bracket is kept verbatim.
pub fn normalize_amount(raw: &str) -> AmountRange {
    let text = clean_text(raw);
    if is_placeholder(&text) {
        return AmountRange::NotDisclosed;
    }

    COMPILED
        .iter()
        .find(|(regex, _)| regex.is_match(&text))
        .map(|(_, bucket)| AmountRange::Bucket(*bucket))
        .unwrap_or(AmountRange::Raw(text))
}
