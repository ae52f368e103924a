//! Symbol appearance alphabet
//!
//! A strip simulates an endless reel by resampling wrapped symbols from a
//! fixed small alphabet while spinning. Entries are asset-catalog keys; the
//! reel resolves them to visual handles at construction.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The fixed set of appearances a strip samples from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSet {
    names: Vec<String>,
}

impl SymbolSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Standard five-symbol alphabet
    pub fn standard() -> Self {
        Self {
            names: (1..=5).map(|i| format!("symbol{i}")).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Appearance name at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Uniformly sample an appearance index. Callers must reject empty sets
    /// at construction; sampling an empty set returns index 0.
    pub fn sample(&self, rng: &mut impl Rng) -> usize {
        if self.names.is_empty() {
            return 0;
        }
        rng.random_range(0..self.names.len())
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::standard()
    }
}
