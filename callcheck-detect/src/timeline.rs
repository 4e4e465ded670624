//! Per-agent ordered container of accepted calls.
//!
//! # Invariants
//!
//! Members are keyed by `(start, end, id)` and are pairwise non-overlapping.
//! For well-formed calls (`start <= end`) this makes the ends non-decreasing
//! in key order: if `m1 < m2` had `m1.end > m2.end`, then either `m2` starts
//! strictly inside `m1` (an overlap) or `m2` is zero-duration at `m1.start`,
//! which the `end` component of the key would have ordered first.
//!
//! Consequently a candidate `c` overlaps some member iff it overlaps the last
//! member whose `start` is before `c.end`: members starting at or after
//! `c.end` cannot overlap `c`, and among the rest the last one has the
//! greatest end. One neighbour probe per insertion is therefore a complete
//! check; [`AgentTimeline::verify`] re-checks the invariants that proof rests on.

use callcheck_core::{overlap, Call, CallId, CallcheckResult, Timestamp, ValidationError};
use std::collections::{BTreeMap, HashMap};

type SlotKey = (Timestamp, Timestamp, CallId);

fn slot_key(call: &Call) -> SlotKey {
    (call.start, call.end, call.id)
}

/// Last member whose start is before `call.end`.
fn neighbour<'a>(slots: &'a BTreeMap<SlotKey, Call>, call: &Call) -> Option<&'a Call> {
    let upper: SlotKey = (call.end, Timestamp::MIN_UTC, CallId::MIN);
    slots.range(..upper).next_back().map(|(_, member)| member)
}

/// Outcome of one insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// No overlap; the call is now a member.
    Accepted,
    /// A call with the same id is already a member. Not a conflict.
    Duplicate,
    /// The call overlaps member `with` and was discarded.
    RejectedOverlap { with: CallId },
}

impl Insertion {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Insertion::Accepted)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Insertion::RejectedOverlap { .. })
    }
}

/// Accepted, conflict-free, start-ordered calls of one agent.
#[derive(Debug, Clone, Default)]
pub struct AgentTimeline {
    agent: String,
    slots: BTreeMap<SlotKey, Call>,
    index: HashMap<CallId, SlotKey>,
    comparisons: u64,
}

impl AgentTimeline {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            ..Self::default()
        }
    }

    /// Partition key of the agent this timeline belongs to.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: CallId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up a member by id.
    pub fn get(&self, id: CallId) -> Option<&Call> {
        self.index.get(&id).and_then(|key| self.slots.get(key))
    }

    /// Members in start order.
    pub fn iter(&self) -> impl Iterator<Item = &Call> + '_ {
        self.slots.values()
    }

    /// Consume the timeline, returning members in start order.
    pub fn into_calls(self) -> Vec<Call> {
        self.slots.into_values().collect()
    }

    /// Overlap predicate evaluations performed by this timeline.
    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    /// Attempt to add `call`.
    ///
    /// Rejected and duplicate calls leave the timeline unchanged.
    pub fn try_insert(&mut self, call: Call) -> Insertion {
        if self.index.contains_key(&call.id) {
            return Insertion::Duplicate;
        }

        let probe = neighbour(&self.slots, &call).map(|member| (member.id, overlap(&call, member)));
        if let Some((with, hit)) = probe {
            self.comparisons += 1;
            if hit {
                return Insertion::RejectedOverlap { with };
            }
        }

        let key = slot_key(&call);
        self.index.insert(call.id, key);
        self.slots.insert(key, call);
        Insertion::Accepted
    }

    /// Check ordering, disjointness and non-decreasing ends across adjacent
    /// members.
    pub fn verify(&self) -> CallcheckResult<()> {
        let members: Vec<&Call> = self.slots.values().collect();
        for pair in members.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let reason = if next.start < prev.start {
                Some("members out of start order")
            } else if overlap(prev, next) {
                Some("accepted members overlap")
            } else if next.end < prev.end {
                Some("member ends decrease; neighbour search is incomplete")
            } else {
                None
            };

            if let Some(reason) = reason {
                tracing::warn!(agent = %self.agent, first = prev.id, second = next.id, reason, "timeline violation");
                return Err(ValidationError::TimelineViolation {
                    agent: self.agent.clone(),
                    first: prev.id,
                    second: next.id,
                    reason: reason.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
