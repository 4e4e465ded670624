//! callcheck Test Utilities
//!
//! Shared test infrastructure for the callcheck workspace:
//! - Proptest generators for calls and call batches
//! - Deterministic fixtures for the reference scenarios
//! - Assertions over reports and storage errors

pub use callcheck_core::{
    timestamp_from_secs, Call, CallId, CallcheckError, CallcheckResult, ConflictReport,
    StorageError, Timestamp,
};

/// 2026-10-15T00:00:00Z, the day all fixtures and generators live in.
pub const BASE_SECS: i64 = 1_792_022_400;

/// Seconds in the fixture day.
pub const DAY_SECS: i64 = 86_400;

/// Timestamp `secs` seconds after [`BASE_SECS`].
pub fn at(secs: i64) -> Timestamp {
    timestamp_from_secs(BASE_SECS + secs)
}

/// Timestamp at `hour:minute` on the fixture day.
pub fn clock(hour: i64, minute: i64) -> Timestamp {
    at(hour * 3600 + minute * 60)
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for calls.

    use super::*;
    use proptest::prelude::*;

    /// A timestamp within the fixture day.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (0i64..DAY_SECS).prop_map(at)
    }

    /// One of a handful of agent names, so generated calls collide often.
    pub fn arb_agent_name() -> impl Strategy<Value = String> {
        (0u8..4).prop_map(|n| format!("agent_{}", n))
    }

    /// A well-formed call of up to ten minutes.
    pub fn arb_call() -> impl Strategy<Value = Call> {
        (any::<CallId>(), arb_agent_name(), arb_timestamp(), 0i64..600).prop_map(
            |(id, agent, start, duration)| {
                Call::new(id, agent, start, start + chrono::Duration::seconds(duration))
            },
        )
    }

    /// Up to `max_len` well-formed calls with unique ids, packed into one
    /// hour so that overlaps are frequent.
    pub fn arb_calls(max_len: usize) -> impl Strategy<Value = Vec<Call>> {
        prop::collection::vec((arb_agent_name(), 0i64..3600, 0i64..600), 0..=max_len).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (agent, offset, duration))| {
                        Call::new(i as CallId + 1, agent, at(offset), at(offset + duration))
                    })
                    .collect()
            },
        )
    }

    /// Calls that never overlap within an agent, in shuffled order.
    ///
    /// Each agent gets up to `max_per_agent` calls laid end to end with
    /// random gaps, some of them touching.
    pub fn arb_non_overlapping_calls(
        agents: usize,
        max_per_agent: usize,
    ) -> impl Strategy<Value = Vec<Call>> {
        prop::collection::vec(
            prop::collection::vec((0i64..120, 0i64..600), 0..=max_per_agent),
            agents,
        )
        .prop_map(|per_agent| {
            let mut calls = Vec::new();
            for (agent, slots) in per_agent.into_iter().enumerate() {
                let mut cursor = 0i64;
                for (gap, duration) in slots {
                    let start = cursor + gap;
                    cursor = start + duration;
                    let id = calls.len() as CallId + 1;
                    calls.push(Call::new(id, format!("agent_{}", agent), at(start), at(cursor)));
                }
            }
            calls
        })
        .prop_shuffle()
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Deterministic inputs for the reference scenarios.

    use super::*;
    use callcheck_storage::{CallSink, CsvCallSink};
    use std::path::{Path, PathBuf};

    /// Agent `X` with `[10:00, 10:05)` and `[10:03, 10:08)`.
    pub fn scenario_overlapping() -> Vec<Call> {
        vec![
            Call::new(1, "X", clock(10, 0), clock(10, 5)),
            Call::new(2, "X", clock(10, 3), clock(10, 8)),
        ]
    }

    /// Agent `X` with `[10:00, 10:05)` and `[10:05, 10:10)`.
    pub fn scenario_touching() -> Vec<Call> {
        vec![
            Call::new(1, "X", clock(10, 0), clock(10, 5)),
            Call::new(2, "X", clock(10, 5), clock(10, 10)),
        ]
    }

    /// Agent `X` with three disjoint calls and agent `Y` with two calls that
    /// overlap `X`'s in clock time only.
    pub fn scenario_other_agent() -> Vec<Call> {
        vec![
            Call::new(1, "X", clock(10, 0), clock(10, 5)),
            Call::new(2, "Y", clock(10, 2), clock(10, 7)),
            Call::new(3, "X", clock(10, 5), clock(10, 10)),
            Call::new(4, "Y", clock(10, 21), clock(10, 25)),
            Call::new(5, "X", clock(10, 20), clock(10, 30)),
        ]
    }

    /// `total` calls spread round-robin across `agents`, never overlapping
    /// within an agent, emitted in a scrambled but reproducible order.
    ///
    /// The `j`-th call of an agent lives inside `[j * 900, j * 900 + 600)`.
    pub fn non_overlapping_calls(agents: usize, total: usize) -> Vec<Call> {
        let agents = agents.max(1);
        let ordered: Vec<Call> = (0..total)
            .map(|i| {
                let slot = (i / agents) as i64;
                let offset = (i as i64 * 37) % 300;
                let duration = 60 + (i as i64 * 53) % 241;
                let start = slot * 900 + offset;
                Call::new(
                    i as CallId + 1,
                    format!("agent_{}", i % agents),
                    at(start),
                    at(start + duration),
                )
            })
            .collect();

        let stride = coprime_stride(total);
        (0..total).map(|i| ordered[(i * stride) % total].clone()).collect()
    }

    fn coprime_stride(total: usize) -> usize {
        [7919, 104_729, 15_485_863]
            .into_iter()
            .find(|candidate| gcd(*candidate, total) == 1)
            .unwrap_or(1)
    }

    fn gcd(mut a: usize, mut b: usize) -> usize {
        while b != 0 {
            (a, b) = (b, a % b);
        }
        a
    }

    /// Write `calls` to `dir/name` in the CSV exchange format.
    pub fn write_calls_csv(dir: &Path, name: &str, calls: &[Call]) -> PathBuf {
        let path = dir.join(name);
        if let Err(e) = CsvCallSink::new(&path).write_calls(calls) {
            panic!("failed to write fixture {}: {}", path.display(), e);
        }
        path
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over conflict reports and storage errors.

    use super::*;

    /// Assert that a report contains no conflicts.
    #[track_caller]
    pub fn assert_clean(report: &ConflictReport) {
        assert!(
            report.is_clean(),
            "Expected no conflicts, got {}: {:?}",
            report.count,
            report.pairs
        );
    }

    /// Assert the conflict count and that it agrees with the recorded pairs.
    #[track_caller]
    pub fn assert_conflicts(report: &ConflictReport, expected: usize) {
        assert_eq!(
            report.count, expected,
            "Conflict count mismatch, pairs: {:?}",
            report.pairs
        );
        assert_eq!(report.pairs.len(), report.count, "Count disagrees with recorded pairs");
    }

    /// Assert that a result is a MalformedRecord error at `line`.
    #[track_caller]
    pub fn assert_malformed<T: std::fmt::Debug>(result: &CallcheckResult<T>, line: u64) {
        match result {
            Err(CallcheckError::Storage(StorageError::MalformedRecord { line: l, .. })) => {
                assert_eq!(*l, line, "Wrong line in MalformedRecord error");
            }
            other => panic!("Expected MalformedRecord at line {}, got: {:?}", line, other),
        }
    }

    /// Assert that a result is a NotFound storage error.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &CallcheckResult<T>) {
        match result {
            Err(CallcheckError::Storage(StorageError::NotFound { .. })) => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
