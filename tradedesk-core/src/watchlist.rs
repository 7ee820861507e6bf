/// Favourited instrument symbols shared across instrument-type tabs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WatchlistStore {
    symbols: HashSet<String>,
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `symbol`, returning whether it is now watched.
    pub fn toggle(&mut self, symbol: &str) -> bool {
        let watched = if self.symbols.remove(symbol) {
            false
        } else {
            self.symbols.insert(symbol.to_string());
            true
        };
        debug!(symbol, watched, "watchlist toggled");
        watched
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn all(&self) -> HashSet<String> {
        self.symbols.clone()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
