//! Ordered fallback ladders.
//!
//! Each extractor describes its fallbacks as a list of pure strategies over
//! the parsed document. A strategy returns `None` when the structure it looks
//! for is absent and `Some` with whatever it found otherwise, however thin.

use scraper::Html;
use tracing::debug;

pub struct Strategy<T> {
    pub name: &'static str,
    pub run: fn(&Html) -> Option<T>,
}

impl<T> Strategy<T> {
    pub const fn new(name: &'static str, run: fn(&Html) -> Option<T>) -> Self {
        Self { name, run }
    }
}

/// Evaluate `strategies` in order, stopping at the first output `accept`
/// approves. When none is approved the last output produced is returned, so
/// callers can still apply a weaker final threshold to it.
pub fn run_ladder<T>(
    strategies: &[Strategy<T>],
    document: &Html,
    accept: impl Fn(&T) -> bool,
) -> Option<(&'static str, T)> {
    let mut last = None;
    for strategy in strategies {
        let Some(output) = (strategy.run)(document) else {
            debug!(strategy = strategy.name, "structure absent");
            continue;
        };
        if accept(&output) {
            debug!(strategy = strategy.name, "accepted");
            return Some((strategy.name, output));
        }
        debug!(strategy = strategy.name, "output below threshold");
        last = Some((strategy.name, output));
    }
    last
}
