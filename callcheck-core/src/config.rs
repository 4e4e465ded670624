//! Configuration types

use crate::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the call exchange file.
pub const DEFAULT_INPUT_PATH: &str = "/tmp/calls-input.csv";

/// Default location of the conflicts output file.
pub const DEFAULT_CONFLICTS_PATH: &str = "/tmp/conflicts.csv";

/// Master configuration for a detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallcheckConfig {
    // Exchange files
    pub input_path: PathBuf,
    pub conflicts_path: PathBuf,

    // Agent name comparison per algorithm
    pub scan_agent_match: AgentMatch,
    pub detect_agent_match: AgentMatch,

    // Ordered detector
    /// Worker threads for per-agent detection (1 = sequential)
    pub workers: usize,
    /// Re-check every timeline after the ordered pass
    pub verify_timelines: bool,

    // Reporting
    /// Write conflicting pairs to `conflicts_path`
    pub write_conflicts: bool,
}

impl Default for CallcheckConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            conflicts_path: PathBuf::from(DEFAULT_CONFLICTS_PATH),
            scan_agent_match: AgentMatch::CaseInsensitive,
            detect_agent_match: AgentMatch::Exact,
            workers: 1,
            verify_timelines: true,
            write_conflicts: false,
        }
    }
}

impl CallcheckConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `CALLCHECK_INPUT`: Call exchange file (default: /tmp/calls-input.csv)
    /// - `CALLCHECK_CONFLICTS_OUTPUT`: Conflicts file (default: /tmp/conflicts.csv)
    /// - `CALLCHECK_SCAN_AGENT_MATCH`: "exact" or "case_insensitive" (default: case_insensitive)
    /// - `CALLCHECK_DETECT_AGENT_MATCH`: "exact" or "case_insensitive" (default: exact)
    /// - `CALLCHECK_WORKERS`: Worker threads for the ordered detector (default: 1)
    /// - `CALLCHECK_VERIFY`: "true" or "false" (default: true)
    /// - `CALLCHECK_WRITE_CONFLICTS`: "true" or "false" (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            input_path: std::env::var("CALLCHECK_INPUT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.input_path),
            conflicts_path: std::env::var("CALLCHECK_CONFLICTS_OUTPUT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.conflicts_path),
            scan_agent_match: env_parsed("CALLCHECK_SCAN_AGENT_MATCH", AgentMatch::from_str_opt)
                .unwrap_or(defaults.scan_agent_match),
            detect_agent_match: env_parsed("CALLCHECK_DETECT_AGENT_MATCH", AgentMatch::from_str_opt)
                .unwrap_or(defaults.detect_agent_match),
            workers: env_parsed("CALLCHECK_WORKERS", |s| s.trim().parse().ok())
                .unwrap_or(defaults.workers),
            verify_timelines: std::env::var("CALLCHECK_VERIFY")
                .ok()
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.verify_timelines),
            write_conflicts: std::env::var("CALLCHECK_WRITE_CONFLICTS")
                .ok()
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.write_conflicts),
        }
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(CallcheckError::Config) if invalid.
    ///
    /// Validates:
    /// - input_path and conflicts_path are non-empty
    /// - input_path and conflicts_path differ when conflicts are written
    /// - workers >= 1
    pub fn validate(&self) -> CallcheckResult<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(CallcheckError::Config(ConfigError::MissingRequired {
                field: "input_path".to_string(),
            }));
        }

        if self.conflicts_path.as_os_str().is_empty() {
            return Err(CallcheckError::Config(ConfigError::MissingRequired {
                field: "conflicts_path".to_string(),
            }));
        }

        if self.write_conflicts && self.input_path == self.conflicts_path {
            return Err(CallcheckError::Config(ConfigError::InvalidValue {
                field: "conflicts_path".to_string(),
                value: self.conflicts_path.display().to_string(),
                reason: "conflicts_path must differ from input_path".to_string(),
            }));
        }

        if self.workers == 0 {
            return Err(CallcheckError::Config(ConfigError::InvalidValue {
                field: "workers".to_string(),
                value: self.workers.to_string(),
                reason: "workers must be at least 1".to_string(),
            }));
        }

        Ok(())
    }
}

fn env_parsed<T>(name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    parse_or_warn(name, &raw, parse)
}

/// Parse `raw`, warning when a non-empty value is rejected so the caller's
/// default does not take over silently.
fn parse_or_warn<T>(name: &str, raw: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse(raw);
    if parsed.is_none() {
        tracing::warn!(variable = name, value = raw, "unparsable value ignored, using default");
    }
    parsed
}

fn parse_flag(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CallcheckConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan_agent_match, AgentMatch::CaseInsensitive);
        assert_eq!(config.detect_agent_match, AgentMatch::Exact);
    }

    #[test]
    fn test_unparsable_env_values_fall_back() {
        let agent_match = |raw: &str| parse_or_warn("CALLCHECK_SCAN_AGENT_MATCH", raw, AgentMatch::from_str_opt);
        assert_eq!(agent_match("case-insensitive"), Some(AgentMatch::CaseInsensitive));
        assert_eq!(agent_match(" EXACT "), Some(AgentMatch::Exact));
        assert_eq!(agent_match("case-insensitve"), None);
        assert_eq!(agent_match("  "), None);

        let workers = |raw: &str| parse_or_warn("CALLCHECK_WORKERS", raw, |s: &str| s.trim().parse::<usize>().ok());
        assert_eq!(workers(" 4 "), Some(4));
        assert_eq!(workers("four"), None);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = CallcheckConfig {
            workers: 0,
            ..CallcheckConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CallcheckError::Config(ConfigError::InvalidValue { ref field, .. })) if field == "workers"
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        let config = CallcheckConfig {
            input_path: PathBuf::new(),
            ..CallcheckConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CallcheckError::Config(ConfigError::MissingRequired { .. }))
        ));
    }

    #[test]
    fn test_conflicts_path_must_differ_when_writing() {
        let config = CallcheckConfig {
            conflicts_path: PathBuf::from(DEFAULT_INPUT_PATH),
            write_conflicts: true,
            ..CallcheckConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("nope"));
    }
}
