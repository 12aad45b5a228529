//! Execution cost and token counters.
//!
//! Stats are an open map of numeric counters rather than a closed struct:
//! the aggregation rule sums *every* key a node reports, so new counters
//! introduced by the service flow through clients without a schema change.
//! `cost`, `inputTokens` and `outputTokens` are the well-known keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Well-known stats key: cost in USD.
pub const STAT_COST: &str = "cost";
/// Well-known stats key: prompt tokens consumed.
pub const STAT_INPUT_TOKENS: &str = "inputTokens";
/// Well-known stats key: completion tokens produced.
pub const STAT_OUTPUT_TOKENS: &str = "outputTokens";

/// Numeric execution counters, keyed by counter name.
///
/// Insertion-ordered so serialized snapshots are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionStats(IndexMap<String, f64>);

impl ExecutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn cost(&self) -> Option<f64> {
        self.get(STAT_COST)
    }

    pub fn input_tokens(&self) -> Option<f64> {
        self.get(STAT_INPUT_TOKENS)
    }

    pub fn output_tokens(&self) -> Option<f64> {
        self.get(STAT_OUTPUT_TOKENS)
    }

    /// Add every counter of `other` into `self`, treating absent keys as 0.
    pub fn merge_add(&mut self, other: &ExecutionStats) {
        for (key, value) in &other.0 {
            *self.0.entry(key.clone()).or_insert(0.0) += value;
        }
    }

    /// Elementwise sum of a sequence of stats maps.
    ///
    /// Keys defined by any contributor are preserved; contributors lacking a
    /// key contribute 0 for it.
    pub fn sum<'a>(parts: impl IntoIterator<Item = &'a ExecutionStats>) -> Self {
        let mut total = Self::new();
        for part in parts {
            total.merge_add(part);
        }
        total
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ExecutionStats {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
