//! callcheck Core - Call Model and Conflict Types
//!
//! Pure data structures shared by every other crate:
//! - [`Call`] records and the strict half-open [`overlap`] predicate
//! - [`AgentMatch`] for agent name comparison
//! - [`ConflictReport`] returned by every detection pass
//! - The error taxonomy and run configuration
//!
//! This crate contains no I/O and no detection algorithms.

mod call;
mod conflict;
mod config;
mod error;
mod identity;

pub use call::{overlap, AgentMatch, Call, CallRef};
pub use config::{CallcheckConfig, DEFAULT_CONFLICTS_PATH, DEFAULT_INPUT_PATH};
pub use conflict::{ConflictPair, ConflictReport};
pub use error::{CallcheckError, CallcheckResult, ConfigError, StorageError, ValidationError};
pub use identity::{timestamp_from_secs, CallId, Timestamp};
