//! callcheck Detect - Conflict Detection Algorithms
//!
//! Two interchangeable strategies over the same [`CallSource`] input:
//!
//! - [`PairwiseScanner`]: exhaustive all-pairs comparison. Quadratic, counts
//!   every conflict in both directions, agent names matched case-insensitively
//!   by default.
//! - [`OrderedDetector`]: per-agent [`AgentTimeline`]s with a single neighbour
//!   probe per insertion. Each conflict is counted once, as the rejected
//!   candidate against the member it collided with.
//!
//! [`detect_partitioned`] runs the ordered detector with agents spread across
//! worker threads.
//!
//! [`CallSource`]: callcheck_storage::CallSource

mod ordered;
mod partition;
mod scanner;
mod timeline;

pub use ordered::{DetectionOutcome, OrderedDetector};
pub use partition::detect_partitioned;
pub use scanner::PairwiseScanner;
pub use timeline::{AgentTimeline, Insertion};
