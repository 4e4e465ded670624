//! Conflict reporting types.
//!
//! A detection pass returns a [`ConflictReport`] instead of accumulating into
//! shared counters, so per-agent passes can run independently and be summed.

use crate::{Call, CallRef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A pair of same-agent calls whose intervals overlap.
///
/// `first` is the call being examined (outer record for the scanner,
/// candidate for the ordered detector); `second` is the call it collided with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictPair {
    pub first: CallRef,
    pub second: CallRef,
}

impl ConflictPair {
    pub fn new(first: CallRef, second: CallRef) -> Self {
        Self { first, second }
    }

    /// Build a pair from two calls.
    pub fn between(first: &Call, second: &Call) -> Self {
        Self::new(first.as_ref_pair(), second.as_ref_pair())
    }

    /// The same pair with ids ordered ascending, for direction-free comparison.
    pub fn normalized(&self) -> Self {
        if self.first.id <= self.second.id {
            self.clone()
        } else {
            Self::new(self.second.clone(), self.first.clone())
        }
    }
}

impl fmt::Display for ConflictPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.first, self.second)
    }
}

/// Outcome of one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Number of conflicts counted by the algorithm.
    pub count: usize,
    /// Conflicting pairs in detection order.
    pub pairs: Vec<ConflictPair>,
    /// Overlap predicate evaluations performed during the pass.
    pub comparisons: u64,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one conflict.
    pub fn record(&mut self, pair: ConflictPair) {
        self.count += 1;
        self.pairs.push(pair);
    }

    /// Whether the pass found no conflicts.
    pub fn is_clean(&self) -> bool {
        self.count == 0
    }

    /// Fold another report into this one. Counts and comparisons add up,
    /// pairs are appended after the existing ones.
    pub fn merge(&mut self, other: ConflictReport) {
        self.count += other.count;
        self.comparisons += other.comparisons;
        self.pairs.extend(other.pairs);
    }

    /// Conflicting pairs with direction removed, in first-seen order.
    ///
    /// The pairwise scanner reports every conflict once per direction; this
    /// view collapses `(a, b)` and `(b, a)` without touching `count`.
    pub fn distinct_pairs(&self) -> Vec<ConflictPair> {
        let mut seen = HashSet::new();
        self.pairs
            .iter()
            .map(ConflictPair::normalized)
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }
}

impl FromIterator<ConflictReport> for ConflictReport {
    fn from_iter<I: IntoIterator<Item = ConflictReport>>(iter: I) -> Self {
        let mut total = ConflictReport::new();
        for report in iter {
            total.merge(report);
        }
        total
    }
}
