//! In-memory source and sinks.

use crate::{CallSink, CallSource, CallStream, ConflictSink};
use callcheck_core::{Call, CallcheckResult, ConflictPair, ConflictReport, StorageError};
use std::sync::RwLock;

/// In-memory call store acting as both source and sink.
///
/// Each pass iterates a snapshot taken when the pass is opened.
#[derive(Debug, Default)]
pub struct InMemoryCalls {
    calls: RwLock<Vec<Call>>,
}

impl InMemoryCalls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calls(calls: Vec<Call>) -> Self {
        Self {
            calls: RwLock::new(calls),
        }
    }

    /// Current number of stored calls.
    pub fn len(&self) -> CallcheckResult<usize> {
        Ok(self
            .calls
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .len())
    }

    pub fn is_empty(&self) -> CallcheckResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl CallSource for InMemoryCalls {
    fn calls(&self) -> CallcheckResult<CallStream<'_>> {
        let snapshot = self
            .calls
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone();
        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }

    fn describe(&self) -> String {
        "in-memory calls".to_string()
    }
}

impl CallSink for InMemoryCalls {
    fn write_calls(&self, calls: &[Call]) -> CallcheckResult<usize> {
        let mut stored = self.calls.write().map_err(|_| StorageError::LockPoisoned)?;
        *stored = calls.to_vec();
        Ok(stored.len())
    }
}

/// In-memory conflict sink.
#[derive(Debug, Default)]
pub struct InMemoryConflicts {
    pairs: RwLock<Vec<ConflictPair>>,
}

impl InMemoryConflicts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the written pairs.
    pub fn pairs(&self) -> CallcheckResult<Vec<ConflictPair>> {
        Ok(self
            .pairs
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone())
    }
}

impl ConflictSink for InMemoryConflicts {
    fn write_conflicts(&self, report: &ConflictReport) -> CallcheckResult<usize> {
        let mut stored = self.pairs.write().map_err(|_| StorageError::LockPoisoned)?;
        *stored = report.pairs.clone();
        Ok(stored.len())
    }
}
