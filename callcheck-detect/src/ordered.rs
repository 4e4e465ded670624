//! Ordered per-agent detector.
//!
//! Maintains one [`AgentTimeline`] per agent. Each incoming call is checked
//! against its agent's accepted members with a single neighbour probe; a
//! colliding call is reported and discarded, so the accepted set per agent is
//! always conflict-free and the cost per insertion is logarithmic in the
//! agent's accepted count.

use crate::timeline::{AgentTimeline, Insertion};
use callcheck_core::{AgentMatch, Call, CallRef, CallcheckResult, ConflictPair, ConflictReport};
use callcheck_storage::CallSource;
use std::collections::{BTreeMap, HashMap};

/// Incremental detector over an open stream of calls.
#[derive(Debug, Clone, Default)]
pub struct OrderedDetector {
    agent_match: AgentMatch,
    timelines: HashMap<String, AgentTimeline>,
    report: ConflictReport,
}

impl OrderedDetector {
    /// Detector partitioning by exact agent name.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent_match(agent_match: AgentMatch) -> Self {
        Self {
            agent_match,
            ..Self::default()
        }
    }

    pub fn agent_match(&self) -> AgentMatch {
        self.agent_match
    }

    /// Check `call` against its agent's timeline and add it if it fits.
    ///
    /// A rejection records one `(candidate) : (existing)` pair. Duplicate ids
    /// within an agent are ignored and are not conflicts.
    pub fn insert(&mut self, call: Call) -> Insertion {
        let key = self.agent_match.key(&call.agent_name).into_owned();
        let timeline = self
            .timelines
            .entry(key)
            .or_insert_with_key(|key| AgentTimeline::new(key.clone()));

        let before = timeline.comparisons();
        let candidate = call.clone();
        let outcome = timeline.try_insert(call);
        self.report.comparisons += timeline.comparisons() - before;

        match outcome {
            Insertion::RejectedOverlap { with } => {
                let pair = match timeline.get(with) {
                    Some(existing) => ConflictPair::between(&candidate, existing),
                    None => ConflictPair::new(
                        candidate.as_ref_pair(),
                        CallRef::new(timeline.agent(), with),
                    ),
                };
                tracing::info!(conflict = %pair, "overlapping call rejected");
                self.report.record(pair);
            }
            Insertion::Duplicate => {
                tracing::debug!(agent = %candidate.agent_name, id = candidate.id, "duplicate call id ignored");
            }
            Insertion::Accepted => {}
        }
        outcome
    }

    /// Conflicts found so far.
    pub fn report(&self) -> &ConflictReport {
        &self.report
    }

    /// Timeline for `agent`, resolved through the configured matching mode.
    pub fn timeline(&self, agent: &str) -> Option<&AgentTimeline> {
        self.timelines.get(self.agent_match.key(agent).as_ref())
    }

    /// Number of agents seen.
    pub fn agent_count(&self) -> usize {
        self.timelines.len()
    }

    /// Close the detector and hand back the report and accepted timelines.
    pub fn finish(self) -> DetectionOutcome {
        DetectionOutcome {
            agent_match: self.agent_match,
            report: self.report,
            timelines: self.timelines.into_iter().collect(),
        }
    }

    /// Insert every call of `calls` in order, then finish.
    pub fn detect(mut self, calls: impl IntoIterator<Item = Call>) -> DetectionOutcome {
        for call in calls {
            self.insert(call);
        }
        let outcome = self.finish();
        outcome.log_summary("in-memory calls");
        outcome
    }

    /// Single pass over `source`. A malformed record aborts the pass.
    pub fn detect_source<S: CallSource + ?Sized>(
        mut self,
        source: &S,
    ) -> CallcheckResult<DetectionOutcome> {
        for call in source.calls()? {
            self.insert(call?);
        }
        let outcome = self.finish();
        outcome.log_summary(&source.describe());
        Ok(outcome)
    }
}

/// Result of an ordered detection pass.
#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    agent_match: AgentMatch,
    /// Conflicts found, with comparison count.
    pub report: ConflictReport,
    timelines: BTreeMap<String, AgentTimeline>,
}

impl DetectionOutcome {
    pub fn agent_match(&self) -> AgentMatch {
        self.agent_match
    }

    /// Timeline for `agent`, resolved through the matching mode of the pass.
    pub fn timeline(&self, agent: &str) -> Option<&AgentTimeline> {
        self.timelines.get(self.agent_match.key(agent).as_ref())
    }

    /// All timelines in agent key order.
    pub fn timelines(&self) -> impl Iterator<Item = &AgentTimeline> + '_ {
        self.timelines.values()
    }

    /// Accepted calls, grouped by agent key and start-ordered within each agent.
    pub fn accepted(&self) -> impl Iterator<Item = &Call> + '_ {
        self.timelines.values().flat_map(AgentTimeline::iter)
    }

    pub fn accepted_count(&self) -> usize {
        self.timelines.values().map(AgentTimeline::len).sum()
    }

    /// Re-check every timeline's ordering invariants.
    pub fn verify(&self) -> CallcheckResult<()> {
        for timeline in self.timelines.values() {
            timeline.verify()?;
        }
        tracing::debug!(agents = self.timelines.len(), "timelines verified");
        Ok(())
    }

    /// Fold in an outcome computed over a disjoint set of agents.
    ///
    /// An agent present on both sides keeps the receiver's timeline.
    pub fn merge(&mut self, other: DetectionOutcome) {
        self.report.merge(other.report);
        for (key, timeline) in other.timelines {
            self.timelines.entry(key).or_insert(timeline);
        }
    }

    pub(crate) fn empty(agent_match: AgentMatch) -> Self {
        Self {
            agent_match,
            ..Self::default()
        }
    }

    fn log_summary(&self, origin: &str) {
        tracing::info!(
            origin,
            agents = self.timelines.len(),
            accepted = self.accepted_count(),
            conflicts = self.report.count,
            comparisons = self.report.comparisons,
            "ordered detection finished"
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================
