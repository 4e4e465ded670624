//! CSV exchange format.
//!
//! One row per call, columns matched by header name:
//!
//! ```text
//! id,agentName,start,end
//! 1,agent_0,2026-10-15T00:00:00Z,2026-10-15T00:04:12Z
//! ```

use crate::{CallSink, CallSource, CallStream, ConflictSink};
use callcheck_core::{Call, CallId, CallcheckError, CallcheckResult, ConflictReport, StorageError};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Header written for call files, in column order.
pub const CALL_HEADER: [&str; 4] = ["id", "agentName", "start", "end"];

/// Header written for conflict files, in column order.
pub const CONFLICT_HEADER: [&str; 4] = ["agentName", "id", "otherAgentName", "otherId"];

// ============================================================================
// READER
// ============================================================================

/// Streaming, fail-fast reader of call rows.
///
/// Yields at most one `Err`; the stream is finished after it.
pub struct CsvCallReader<R: io::Read> {
    origin: String,
    records: csv::DeserializeRecordsIntoIter<R, Call>,
    failed: bool,
}

impl<R: io::Read> CsvCallReader<R> {
    /// Wrap any reader. `origin` names the input in errors.
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_deserialize::<Call>();
        Self {
            origin: origin.into(),
            records,
            failed: false,
        }
    }

    fn map_err(&self, err: csv::Error) -> CallcheckError {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.kind() {
            csv::ErrorKind::Io(io_err) => StorageError::SourceUnavailable {
                path: self.origin.clone(),
                reason: io_err.to_string(),
            }
            .into(),
            csv::ErrorKind::Deserialize { err: de, .. } => StorageError::MalformedRecord {
                line,
                reason: de.to_string(),
            }
            .into(),
            _ => StorageError::MalformedRecord {
                line,
                reason: err.to_string(),
            }
            .into(),
        }
    }
}

impl<R: io::Read> Iterator for CsvCallReader<R> {
    type Item = CallcheckResult<Call>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.records.next()? {
            Ok(call) => Some(Ok(call)),
            Err(err) => {
                self.failed = true;
                let err = self.map_err(err);
                tracing::warn!(origin = %self.origin, error = %err, "aborting call stream");
                Some(Err(err))
            }
        }
    }
}

// ============================================================================
// FILE SOURCE
// ============================================================================

/// Call source backed by a CSV file; each pass re-opens the file.
#[derive(Debug, Clone)]
pub struct CsvCallSource {
    path: PathBuf,
}

impl CsvCallSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> CallcheckResult<File> {
        File::open(&self.path).map_err(|e| {
            let path = self.path.display().to_string();
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound { path }.into()
            } else {
                StorageError::SourceUnavailable {
                    path,
                    reason: e.to_string(),
                }
                .into()
            }
        })
    }
}

impl CallSource for CsvCallSource {
    fn calls(&self) -> CallcheckResult<CallStream<'_>> {
        let file = self.open()?;
        tracing::trace!(path = %self.path.display(), "opened call source");
        Ok(Box::new(CsvCallReader::new(
            file,
            self.path.display().to_string(),
        )))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// FILE SINKS
// ============================================================================

fn write_failed(path: &Path, err: impl ToString) -> CallcheckError {
    StorageError::WriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}

/// Write `header` followed by one serialized row per item.
fn write_rows<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> CallcheckResult<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| write_failed(path, e))?;
    writer
        .write_record(header)
        .map_err(|e| write_failed(path, e))?;

    let mut written = 0;
    for row in rows {
        writer.serialize(row).map_err(|e| write_failed(path, e))?;
        written += 1;
    }
    writer.flush().map_err(|e| write_failed(path, e))?;
    Ok(written)
}

/// Call sink writing the CSV exchange format.
#[derive(Debug, Clone)]
pub struct CsvCallSink {
    path: PathBuf,
}

impl CsvCallSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CallSink for CsvCallSink {
    fn write_calls(&self, calls: &[Call]) -> CallcheckResult<usize> {
        let written = write_rows(&self.path, &CALL_HEADER, calls)?;
        tracing::debug!(path = %self.path.display(), rows = written, "wrote calls");
        Ok(written)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConflictRow<'a> {
    agent_name: &'a str,
    id: CallId,
    other_agent_name: &'a str,
    other_id: CallId,
}

/// Conflict sink writing `agentName,id,otherAgentName,otherId` rows.
#[derive(Debug, Clone)]
pub struct CsvConflictSink {
    path: PathBuf,
}

impl CsvConflictSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConflictSink for CsvConflictSink {
    fn write_conflicts(&self, report: &ConflictReport) -> CallcheckResult<usize> {
        let rows = report.pairs.iter().map(|pair| ConflictRow {
            agent_name: &pair.first.agent_name,
            id: pair.first.id,
            other_agent_name: &pair.second.agent_name,
            other_id: pair.second.id,
        });
        let written = write_rows(&self.path, &CONFLICT_HEADER, rows)?;
        tracing::debug!(path = %self.path.display(), rows = written, "wrote conflicts");
        Ok(written)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use callcheck_core::timestamp_from_secs;

    fn read(input: &str) -> Vec<CallcheckResult<Call>> {
        CsvCallReader::new(input.as_bytes(), "inline").collect()
    }

    #[test]
    fn test_reads_rows_by_header_name() {
        let input = "agentName,end,id,start\n\
                     agent_1,1970-01-01T00:05:00Z,7,1970-01-01T00:00:00Z\n";
        let rows = read(input);
        assert_eq!(rows.len(), 1);
        let call = rows[0].as_ref().unwrap();
        assert_eq!(call.id, 7);
        assert_eq!(call.agent_name, "agent_1");
        assert_eq!(call.start, timestamp_from_secs(0));
        assert_eq!(call.end, timestamp_from_secs(300));
    }

    #[test]
    fn test_trims_whitespace() {
        let input = "id,agentName,start,end\n 3 , agent_2 , 1970-01-01T00:00:00Z , 1970-01-01T00:00:10Z \n";
        let rows = read(input);
        let call = rows[0].as_ref().unwrap();
        assert_eq!(call.id, 3);
        assert_eq!(call.agent_name, "agent_2");
    }

    #[test]
    fn test_malformed_row_is_fail_fast() {
        let input = "id,agentName,start,end\n\
                     1,a,1970-01-01T00:00:00Z,1970-01-01T00:00:10Z\n\
                     2,a,not-a-time,1970-01-01T00:00:10Z\n\
                     3,a,1970-01-01T00:00:00Z,1970-01-01T00:00:10Z\n";
        let rows = read(input);
        assert_eq!(rows.len(), 2, "stream must end after the first error");
        assert!(rows[0].is_ok());
        match &rows[1] {
            Err(CallcheckError::Storage(StorageError::MalformedRecord { line, .. })) => {
                assert_eq!(*line, 3);
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let input = "id,agentName,start\n1,a,1970-01-01T00:00:00Z\n";
        let rows = read(input);
        assert!(matches!(
            rows[0],
            Err(CallcheckError::Storage(StorageError::MalformedRecord { .. }))
        ));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(read("").is_empty());
        assert!(read("id,agentName,start,end\n").is_empty());
    }
}
