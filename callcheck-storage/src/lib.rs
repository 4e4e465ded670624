//! callcheck Storage - Record Source/Sink Traits and Implementations
//!
//! Defines the narrow contracts the detection algorithms consume:
//! - [`CallSource`]: a replayable, lazily parsed sequence of call records
//! - [`CallSink`]: materializes calls back into the exchange format
//! - [`ConflictSink`]: writes the pairs of a [`ConflictReport`]
//!
//! Implementations:
//! - [`CsvCallSource`], [`CsvCallSink`], [`CsvConflictSink`] for the CSV
//!   exchange file (`id,agentName,start,end`, RFC 3339 timestamps)
//! - [`InMemoryCalls`], [`InMemoryConflicts`] for tests and embedding
//!
//! Malformed rows are fail-fast: a stream yields the error once and then ends,
//! so a consumer propagating with `?` aborts the pass instead of silently
//! skipping rows and under-counting conflicts.

pub mod memory;
pub mod tabular;

pub use memory::{InMemoryCalls, InMemoryConflicts};
pub use tabular::{
    CsvCallReader, CsvCallSink, CsvCallSource, CsvConflictSink, CALL_HEADER, CONFLICT_HEADER,
};

use callcheck_core::{Call, CallcheckResult, ConflictReport};

// ============================================================================
// SOURCE / SINK TRAITS
// ============================================================================

/// A lazily produced sequence of call records.
pub type CallStream<'a> = Box<dyn Iterator<Item = CallcheckResult<Call>> + 'a>;

/// A replayable supplier of call records.
///
/// Every call to [`calls`](CallSource::calls) starts a fresh pass from the
/// first record, so a source can be traversed more than once (the pairwise
/// scanner relies on this).
pub trait CallSource {
    /// Open a new pass over the records.
    ///
    /// Fails with `StorageError::NotFound` or `StorageError::SourceUnavailable`
    /// when the backing resource cannot be opened. Per-row failures surface as
    /// `Err` items of the returned stream.
    fn calls(&self) -> CallcheckResult<CallStream<'_>>;

    /// Human readable origin used in log lines.
    fn describe(&self) -> String;

    /// Materialize one full pass into memory.
    fn read_all(&self) -> CallcheckResult<Vec<Call>> {
        self.calls()?.collect()
    }
}

/// A consumer that writes a finite sequence of calls.
pub trait CallSink {
    /// Write all calls, replacing previous contents. Returns rows written.
    fn write_calls(&self, calls: &[Call]) -> CallcheckResult<usize>;
}

/// A consumer that writes the conflicting pairs of a report.
pub trait ConflictSink {
    /// Write one row per pair, replacing previous contents. Returns rows written.
    fn write_conflicts(&self, report: &ConflictReport) -> CallcheckResult<usize>;
}

impl CallSource for [Call] {
    fn calls(&self) -> CallcheckResult<CallStream<'_>> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }

    fn describe(&self) -> String {
        format!("slice of {} calls", self.len())
    }
}

impl CallSource for Vec<Call> {
    fn calls(&self) -> CallcheckResult<CallStream<'_>> {
        self.as_slice().calls()
    }

    fn describe(&self) -> String {
        self.as_slice().describe()
    }
}

impl<S: CallSource + ?Sized> CallSource for &S {
    fn calls(&self) -> CallcheckResult<CallStream<'_>> {
        (**self).calls()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
