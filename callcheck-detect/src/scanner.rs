//! Exhaustive pairwise scanner.
//!
//! Compares every call against every other call of the same agent. Quadratic
//! in the input size, and each conflicting pair is counted once per direction.
//! Kept as the reference the ordered detector is measured against.

use callcheck_core::{overlap, AgentMatch, Call, CallcheckResult, ConflictPair, ConflictReport};
use callcheck_storage::CallSource;

/// All-pairs conflict scanner.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseScanner {
    agent_match: AgentMatch,
}

impl Default for PairwiseScanner {
    fn default() -> Self {
        Self {
            agent_match: AgentMatch::CaseInsensitive,
        }
    }
}

impl PairwiseScanner {
    /// Scanner matching agent names case-insensitively.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent_match(agent_match: AgentMatch) -> Self {
        Self { agent_match }
    }

    pub fn agent_match(&self) -> AgentMatch {
        self.agent_match
    }

    /// Scan an in-memory batch.
    pub fn scan(&self, calls: &[Call]) -> ConflictReport {
        let mut report = ConflictReport::new();
        for call in calls {
            for other in calls {
                self.visit(call, other, &mut report);
            }
        }
        self.log_summary(calls.len(), &report, "in-memory calls");
        report
    }

    /// Scan a replayable source, opening a fresh inner pass per outer record.
    ///
    /// Memory stays constant in the input size. Any open or parse failure,
    /// on the outer or an inner pass, aborts the scan.
    pub fn scan_source<S: CallSource + ?Sized>(&self, source: &S) -> CallcheckResult<ConflictReport> {
        let mut report = ConflictReport::new();
        let mut records = 0usize;
        for call in source.calls()? {
            let call = call?;
            records += 1;
            for other in source.calls()? {
                self.visit(&call, &other?, &mut report);
            }
        }
        self.log_summary(records, &report, &source.describe());
        Ok(report)
    }

    fn visit(&self, call: &Call, other: &Call, report: &mut ConflictReport) {
        if call.is_same_call(other) || !self.agent_match.matches(&call.agent_name, &other.agent_name) {
            return;
        }
        report.comparisons += 1;
        if overlap(call, other) {
            let pair = ConflictPair::between(call, other);
            tracing::info!(conflict = %pair, "overlapping calls");
            report.record(pair);
        }
    }

    fn log_summary(&self, records: usize, report: &ConflictReport, origin: &str) {
        tracing::info!(
            origin,
            records,
            agent_match = %self.agent_match,
            conflicts = report.count,
            comparisons = report.comparisons,
            "pairwise scan finished"
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use callcheck_core::{timestamp_from_secs, CallRef};
    use callcheck_storage::InMemoryCalls;

    fn call(id: i64, agent: &str, start: i64, end: i64) -> Call {
        Call::new(id, agent, timestamp_from_secs(start), timestamp_from_secs(end))
    }

    #[test]
    fn test_counts_each_conflict_in_both_directions() {
        let calls = vec![call(1, "agent_0", 0, 300), call(2, "agent_0", 180, 480)];
        let report = PairwiseScanner::new().scan(&calls);

        assert_eq!(report.count, 2);
        assert_eq!(
            report.pairs,
            vec![
                ConflictPair::new(CallRef::new("agent_0", 1), CallRef::new("agent_0", 2)),
                ConflictPair::new(CallRef::new("agent_0", 2), CallRef::new("agent_0", 1)),
            ]
        );
        assert_eq!(report.distinct_pairs().len(), 1);
    }

    #[test]
    fn test_same_id_is_never_compared() {
        let calls = vec![call(1, "agent_0", 0, 300), call(1, "agent_0", 0, 300)];
        let report = PairwiseScanner::new().scan(&calls);
        assert!(report.is_clean());
        assert_eq!(report.comparisons, 0);
    }

    #[test]
    fn test_agent_matching_modes() {
        let calls = vec![call(1, "Agent_7", 0, 300), call(2, "agent_7", 100, 200)];
        assert_eq!(PairwiseScanner::new().scan(&calls).count, 2);
        assert!(PairwiseScanner::with_agent_match(AgentMatch::Exact)
            .scan(&calls)
            .is_clean());
    }

    #[test]
    fn test_comparisons_cover_same_agent_ordered_pairs() {
        let calls: Vec<_> = (0..6)
            .map(|i| call(i, if i % 2 == 0 { "a" } else { "b" }, i * 100, i * 100 + 50))
            .collect();
        let report = PairwiseScanner::new().scan(&calls);
        // Two agents with three calls each: 2 * 3 * 2 ordered pairs.
        assert_eq!(report.comparisons, 12);
        assert!(report.is_clean());
    }

    #[test]
    fn test_source_scan_matches_batch_scan() {
        let calls = vec![
            call(1, "agent_0", 0, 300),
            call(2, "agent_0", 180, 480),
            call(3, "agent_1", 0, 300),
            call(4, "agent_0", 480, 600),
        ];
        let scanner = PairwiseScanner::new();
        let from_source = scanner
            .scan_source(&InMemoryCalls::with_calls(calls.clone()))
            .unwrap();
        assert_eq!(from_source, scanner.scan(&calls));
    }
}
