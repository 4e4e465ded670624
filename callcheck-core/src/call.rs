//! Call records and the overlap predicate.
//!
//! A [`Call`] is a half-open interval `[start, end)` owned by one agent.
//! Two calls conflict when they belong to the same agent, are not the same
//! call, and [`overlap`] holds.
//!
//! # Boundary behaviour
//!
//! - Touching calls (`b.start == a.end`) do not overlap.
//! - Two zero-duration calls never overlap each other.
//! - A zero-duration call strictly inside another call does overlap it.
//! - Inverted calls (`start > end`) are not rejected here; the predicate is
//!   still symmetric for them but carries no scheduling meaning.

use crate::{CallId, Timestamp};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

// ============================================================================
// CALL RECORD
// ============================================================================

/// A time-bounded unit of work assigned to one agent.
///
/// Field names serialize in camelCase so the tabular header reads
/// `id,agentName,start,end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: CallId,
    pub agent_name: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Call {
    /// Create a new call record.
    pub fn new(id: CallId, agent_name: impl Into<String>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            id,
            agent_name: agent_name.into(),
            start,
            end,
        }
    }

    /// Length of the call. Negative for inverted records.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Whether `start == end`.
    pub fn is_zero_duration(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` is the same call (identity by id).
    pub fn is_same_call(&self, other: &Call) -> bool {
        self.id == other.id
    }

    /// Check this call against `other` with the strict half-open test.
    ///
    /// Identity and agent filtering are the caller's responsibility.
    #[inline]
    pub fn overlaps(&self, other: &Call) -> bool {
        overlap(self, other)
    }

    /// The `(agent, id)` reference used in conflict logs.
    pub fn as_ref_pair(&self) -> CallRef {
        CallRef {
            agent_name: self.agent_name.clone(),
            id: self.id,
        }
    }
}

/// Strict half-open overlap test: `b.end > a.start && b.start < a.end`.
///
/// Symmetric in `a` and `b`. End instants are exclusive.
#[inline]
pub fn overlap(a: &Call, b: &Call) -> bool {
    b.end > a.start && b.start < a.end
}

// ============================================================================
// CALL REFERENCE
// ============================================================================

/// Identity of one side of a conflict: `(agentName, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRef {
    pub agent_name: String,
    pub id: CallId,
}

impl CallRef {
    pub fn new(agent_name: impl Into<String>, id: CallId) -> Self {
        Self {
            agent_name: agent_name.into(),
            id,
        }
    }
}

impl fmt::Display for CallRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.agent_name, self.id)
    }
}

// ============================================================================
// AGENT MATCHING
// ============================================================================

/// How agent names are compared when deciding whether two calls may conflict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMatch {
    /// Names must be byte-for-byte equal.
    #[default]
    Exact,
    /// Names are compared after Unicode lower-case folding.
    CaseInsensitive,
}

impl AgentMatch {
    /// Whether two agent names refer to the same agent.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            AgentMatch::Exact => a == b,
            AgentMatch::CaseInsensitive => {
                if a.is_ascii() && b.is_ascii() {
                    a.eq_ignore_ascii_case(b)
                } else {
                    a.to_lowercase() == b.to_lowercase()
                }
            }
        }
    }

    /// Partition key for an agent name. Names that [`matches`](Self::matches)
    /// considers equal produce equal keys.
    pub fn key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            AgentMatch::Exact => Cow::Borrowed(name),
            AgentMatch::CaseInsensitive => {
                if name.is_ascii() && !name.bytes().any(|b| b.is_ascii_uppercase()) {
                    Cow::Borrowed(name)
                } else {
                    Cow::Owned(name.to_lowercase())
                }
            }
        }
    }

    /// Convert to the configuration string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentMatch::Exact => "exact",
            AgentMatch::CaseInsensitive => "case_insensitive",
        }
    }

    /// Parse from the configuration string representation.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Some(AgentMatch::Exact),
            "case_insensitive" | "case-insensitive" | "ignore_case" => {
                Some(AgentMatch::CaseInsensitive)
            }
            _ => None,
        }
    }
}

impl fmt::Display for AgentMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp_from_secs;
    use proptest::prelude::*;

    fn call(id: CallId, agent: &str, start: i64, end: i64) -> Call {
        Call::new(id, agent, timestamp_from_secs(start), timestamp_from_secs(end))
    }

    #[test]
    fn test_overlap_partial() {
        let a = call(1, "x", 0, 300);
        let b = call(2, "x", 180, 480);
        assert!(overlap(&a, &b));
        assert!(overlap(&b, &a));
    }

    #[test]
    fn test_overlap_touching_is_not_overlap() {
        let a = call(1, "x", 0, 300);
        let b = call(2, "x", 300, 600);
        assert!(!overlap(&a, &b));
        assert!(!overlap(&b, &a));
    }

    #[test]
    fn test_overlap_containment() {
        let outer = call(1, "x", 0, 600);
        let inner = call(2, "x", 100, 200);
        assert!(overlap(&outer, &inner));
        assert!(overlap(&inner, &outer));
    }

    #[test]
    fn test_zero_duration_boundaries() {
        let a = call(1, "x", 100, 100);
        let b = call(2, "x", 100, 100);
        assert!(a.is_zero_duration());
        assert!(!overlap(&a, &b));

        let host = call(3, "x", 100, 200);
        assert!(!overlap(&a, &host), "zero-duration call at host start only touches");

        let inside = call(4, "x", 150, 150);
        assert!(overlap(&inside, &host), "zero-duration call strictly inside overlaps");
    }

    #[test]
    fn test_call_ref_display() {
        let r = call(7, "agent_3", 0, 1).as_ref_pair();
        assert_eq!(r.to_string(), "(agent_3, 7)");
    }

    #[test]
    fn test_agent_match_case_insensitive() {
        assert!(AgentMatch::CaseInsensitive.matches("Agent_1", "agent_1"));
        assert!(!AgentMatch::Exact.matches("Agent_1", "agent_1"));
        assert!(AgentMatch::CaseInsensitive.matches("ÅSA", "åsa"));
        assert_eq!(AgentMatch::CaseInsensitive.key("Agent_1"), "agent_1");
        assert_eq!(AgentMatch::Exact.key("Agent_1"), "Agent_1");
    }

    #[test]
    fn test_agent_match_roundtrip() {
        for mode in [AgentMatch::Exact, AgentMatch::CaseInsensitive] {
            assert_eq!(AgentMatch::from_str_opt(mode.as_str()), Some(mode));
        }
        assert_eq!(AgentMatch::from_str_opt("fuzzy"), None);
    }

    #[test]
    fn test_call_serializes_camel_case() {
        let json = serde_json::to_string(&call(1, "x", 0, 60)).unwrap();
        assert!(json.contains("\"agentName\""));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Overlap is symmetric for arbitrary intervals.
        #[test]
        fn prop_overlap_symmetric(
            s1 in 0i64..10_000, d1 in 0i64..600,
            s2 in 0i64..10_000, d2 in 0i64..600,
        ) {
            let a = call(1, "x", s1, s1 + d1);
            let b = call(2, "x", s2, s2 + d2);
            prop_assert_eq!(overlap(&a, &b), overlap(&b, &a));
        }

        /// Back-to-back calls never overlap.
        #[test]
        fn prop_touching_never_overlaps(s in 0i64..10_000, d1 in 1i64..600, d2 in 1i64..600) {
            let a = call(1, "x", s, s + d1);
            let b = call(2, "x", s + d1, s + d1 + d2);
            prop_assert!(!overlap(&a, &b));
            prop_assert!(!overlap(&b, &a));
        }

        /// Sharing any open sub-interval means overlap.
        #[test]
        fn prop_shared_subinterval_overlaps(s in 0i64..10_000, d in 2i64..600, shift in 1i64..600) {
            let a = call(1, "x", s, s + d);
            let shift = shift % d;
            let b = call(2, "x", s + shift, s + shift + d);
            prop_assert!(overlap(&a, &b));
        }

        /// Folded keys agree with `matches`.
        #[test]
        fn prop_agent_key_consistent(a in "[a-zA-Z_0-9]{1,8}", b in "[a-zA-Z_0-9]{1,8}") {
            let mode = AgentMatch::CaseInsensitive;
            prop_assert_eq!(mode.matches(&a, &b), mode.key(&a) == mode.key(&b));
        }
    }
}
