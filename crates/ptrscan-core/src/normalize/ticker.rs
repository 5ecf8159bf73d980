//! Ticker extraction from free-text asset descriptions.

use std::fmt::Debug;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::domain::Chamber;
use crate::Ticker;

/// Ordered extraction patterns: `(name, pattern, html_only)`.
///
/// Evaluated first-match-wins. The bare standalone pattern is too noisy for
/// PDF layout text and only runs for HTML sources.
pub const TICKER_PATTERNS: [(&str, &str, bool); 6] = [
    ("parenthesized", r"\(([A-Z]{1,5})\)", false),
    ("dash_mid", r"\s-\s([A-Z]{1,5})\s", false),
    ("dash_end", r"\s-\s([A-Z]{1,5})$", false),
    ("bracketed", r"\[([A-Z]{1,5})\]", false),
    ("leading", r"^([A-Z]{1,5})\s", false),
    ("standalone", r"\b([A-Z]{2,5})\b", true),
];

static COMPILED: LazyLock<Vec<(&'static str, Regex, bool)>> = LazyLock::new(|| {
    TICKER_PATTERNS
        .iter()
        .map(|(name, pattern, html_only)| {
            let regex = Regex::new(pattern).expect("ticker pattern must compile");
            (*name, regex, *html_only)
        })
        .collect()
});

/// One way of pulling a ticker out of asset text.
pub trait TickerStrategy: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// A candidate that already passed the [`Ticker`] gate, if any.
    fn extract(&self, text: &str) -> Option<Ticker>;
}

/// Strategy backed by a regex whose first capture group is the candidate.
#[derive(Debug, Clone)]
pub struct RegexStrategy {
    name: String,
    regex: Regex,
}

impl RegexStrategy {
    pub fn new(name: impl Into<String>, regex: Regex) -> Self {
        Self {
            name: name.into(),
            regex,
        }
    }
}

impl TickerStrategy for RegexStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, text: &str) -> Option<Ticker> {
        let captures = self.regex.captures(text)?;
        let candidate = captures.get(1)?.as_str().trim().to_uppercase();
        Ticker::parse(&candidate).ok()
    }
}

/// Chain of responsibility over [`TickerStrategy`] values.
#[derive(Debug, Clone, Default)]
pub struct TickerChain {
    strategies: Vec<Arc<dyn TickerStrategy>>,
}

impl TickerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in patterns for the chamber's source format.
    pub fn for_chamber(chamber: Chamber) -> Self {
        let html = chamber == Chamber::Senate;
        COMPILED
            .iter()
            .filter(|(_, _, html_only)| html || !html_only)
            .fold(Self::new(), |chain, (name, regex, _)| {
                chain.with_strategy(RegexStrategy::new(*name, regex.clone()))
            })
    }

    /// Append a strategy; it runs after every existing one.
    pub fn with_strategy(mut self, strategy: impl TickerStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    pub fn extract(&self, text: &str) -> Option<Ticker> {
        if text.is_empty() {
            return None;
        }
        self.strategies
            .iter()
            .find_map(|strategy| strategy.extract(text))
    }
}
