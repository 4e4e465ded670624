//! Agent-partitioned ordered detection across worker threads.
//!
//! Timelines never interact across agents, so the input is grouped by agent
//! key and each group is detected independently. Within a group the input
//! order is preserved, which keeps the result identical to a sequential pass
//! up to the interleaving of pairs between agents. Results are merged in agent
//! key order regardless of the worker count.

use crate::ordered::{DetectionOutcome, OrderedDetector};
use callcheck_core::{AgentMatch, Call};
use std::collections::BTreeMap;

/// Run ordered detection with calls grouped by agent across `workers` threads.
///
/// `workers <= 1` runs on the calling thread.
pub fn detect_partitioned(calls: Vec<Call>, agent_match: AgentMatch, workers: usize) -> DetectionOutcome {
    let total = calls.len();
    let mut groups: BTreeMap<String, Vec<Call>> = BTreeMap::new();
    for call in calls {
        let key = agent_match.key(&call.agent_name).into_owned();
        groups.entry(key).or_default().push(call);
    }
    let groups: Vec<Vec<Call>> = groups.into_values().collect();
    let workers = workers.max(1).min(groups.len().max(1));

    tracing::debug!(calls = total, agents = groups.len(), workers, "partitioned detection");

    let run = |group: Vec<Call>| OrderedDetector::with_agent_match(agent_match).detect_group(group);

    let mut results: Vec<(usize, DetectionOutcome)> = if workers == 1 {
        groups.into_iter().map(run).enumerate().collect()
    } else {
        let mut buckets: Vec<Vec<(usize, Vec<Call>)>> = (0..workers).map(|_| Vec::new()).collect();
        for (index, group) in groups.into_iter().enumerate() {
            buckets[index % workers].push((index, group));
        }

        std::thread::scope(|scope| {
            let handles: Vec<_> = buckets
                .into_iter()
                .map(|bucket| {
                    scope.spawn(move || {
                        bucket
                            .into_iter()
                            .map(|(index, group)| (index, run(group)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut results = Vec::new();
            for handle in handles {
                match handle.join() {
                    Ok(part) => results.extend(part),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            results
        })
    };

    results.sort_by_key(|(index, _)| *index);
    let mut outcome = DetectionOutcome::empty(agent_match);
    for (_, part) in results {
        outcome.merge(part);
    }

    tracing::info!(
        agents = outcome.timelines().count(),
        accepted = outcome.accepted_count(),
        conflicts = outcome.report.count,
        comparisons = outcome.report.comparisons,
        workers,
        "partitioned detection finished"
    );
    outcome
}

impl OrderedDetector {
    /// Insert one agent's calls without the per-pass summary line.
    fn detect_group(mut self, calls: Vec<Call>) -> DetectionOutcome {
        for call in calls {
            self.insert(call);
        }
        self.finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
