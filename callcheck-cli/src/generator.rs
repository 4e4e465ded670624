//! Synthetic call input generator.
//!
//! Produces one day of back-to-back calls per agent. Conflicts only enter the
//! data through "imposter" calls: calls of one randomly chosen secret agent
//! that get re-labelled with another agent's name.

use callcheck_core::{Call, CallId, CallcheckResult, ConfigError, Timestamp};
use chrono::{NaiveTime, TimeDelta, Utc};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Longest generated day accepted by [`GeneratorConfig::validate`].
pub const MAX_DAY_SECONDS: i64 = 366 * 86_400;

/// Configuration for generating call input.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of agents, named `agent_0` .. `agent_{n-1}`.
    pub num_agents: usize,
    /// First instant of the generated day.
    pub day_start: Timestamp,
    /// Length of the generated day in seconds.
    pub day_seconds: i64,
    /// Mean call length; actual lengths vary uniformly by up to this much either way.
    pub avg_call_secs: f64,
    /// Mean gap between calls, varied the same way.
    pub avg_break_secs: f64,
    /// Chance that a secret-agent call is re-labelled.
    pub imposter_probability: f64,
    /// Disable re-labelling entirely.
    pub include_imposters: bool,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_agents: 75,
            day_start: Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc(),
            day_seconds: 86_400,
            avg_call_secs: 300.0,
            avg_break_secs: 500.0,
            imposter_probability: 0.1,
            include_imposters: true,
            seed: 42,
        }
    }
}

fn invalid<T>(field: &str, value: String, reason: &str) -> CallcheckResult<T> {
    Err(ConfigError::InvalidValue {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    }
    .into())
}

impl GeneratorConfig {
    pub fn validate(&self) -> CallcheckResult<()> {
        if self.num_agents == 0 {
            return invalid("num_agents", "0".to_string(), "at least one agent is required");
        }
        if !(1..=MAX_DAY_SECONDS).contains(&self.day_seconds) {
            return invalid(
                "day_seconds",
                self.day_seconds.to_string(),
                "must be positive and at most 366 days",
            );
        }
        let day = self.day_seconds as f64;
        if !(self.avg_call_secs.is_finite() && (0.0..=day).contains(&self.avg_call_secs)) {
            return invalid(
                "avg_call_secs",
                self.avg_call_secs.to_string(),
                "must be between 0 and day_seconds",
            );
        }
        if !(self.avg_break_secs.is_finite() && (0.0..=day).contains(&self.avg_break_secs)) {
            return invalid(
                "avg_break_secs",
                self.avg_break_secs.to_string(),
                "must be between 0 and day_seconds",
            );
        }
        // A call starts before the day ends and lasts under two averages.
        let horizon = TimeDelta::try_seconds(3 * self.day_seconds);
        if horizon.and_then(|h| self.day_start.checked_add_signed(h)).is_none() {
            return invalid(
                "day_start",
                self.day_start.to_rfc3339(),
                "generated calls would leave the representable time range",
            );
        }
        if !(0.0..=1.0).contains(&self.imposter_probability) {
            return invalid(
                "imposter_probability",
                self.imposter_probability.to_string(),
                "must be between 0.0 and 1.0",
            );
        }
        Ok(())
    }
}

/// Output of one generation run.
#[derive(Debug, Clone)]
pub struct GeneratedCalls {
    /// All calls, shuffled.
    pub calls: Vec<Call>,
    /// Index of the agent whose calls may have been re-labelled.
    pub secret_agent: usize,
    /// Number of re-labelled calls.
    pub imposter_count: usize,
}

/// Seeded generator; the same config always produces the same calls.
pub struct CallGenerator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl CallGenerator {
    pub fn new(config: GeneratorConfig) -> CallcheckResult<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&mut self) -> CallcheckResult<GeneratedCalls> {
        let num_agents = self.config.num_agents;
        let secret_agent = self.rng.random_range(0..num_agents);
        let mut calls = Vec::new();
        let mut imposter_count = 0;
        let mut next_id: CallId = 1;

        for agent in 0..num_agents {
            let mut offset = 0i64;
            while offset < self.config.day_seconds {
                let start = self.at(offset)?;
                let duration = self.vary(self.config.avg_call_secs);
                let mut agent_name = format!("agent_{}", agent);

                if agent == secret_agent
                    && self.config.include_imposters
                    && self.rng.random_bool(self.config.imposter_probability)
                {
                    agent_name = format!("agent_{}", self.rng.random_range(0..num_agents));
                    imposter_count += 1;
                    tracing::info!(agent = %agent_name, id = next_id, "imposter call");
                }

                let end = self.at(offset.saturating_add(duration))?;
                calls.push(Call::new(next_id, agent_name, start, end));
                next_id += 1;

                let pause = self.vary(self.config.avg_break_secs);
                offset = offset.saturating_add(duration).saturating_add(pause).saturating_add(1);
            }
        }

        calls.shuffle(&mut self.rng);
        tracing::info!(
            calls = calls.len(),
            agents = num_agents,
            secret_agent,
            imposter_count,
            seed = self.config.seed,
            "generated call input"
        );

        Ok(GeneratedCalls {
            calls,
            secret_agent,
            imposter_count,
        })
    }

    /// `day_start` shifted by `offset` seconds.
    fn at(&self, offset: i64) -> CallcheckResult<Timestamp> {
        TimeDelta::try_seconds(offset)
            .and_then(|delta| self.config.day_start.checked_add_signed(delta))
            .map_or_else(
                || invalid("day_start", self.config.day_start.to_rfc3339(), "call time out of range"),
                Ok,
            )
    }

    /// `avg` shifted by a uniform amount in `[0, avg)` up or down, truncated.
    fn vary(&mut self, avg: f64) -> i64 {
        let shift: f64 = self.rng.random::<f64>() * avg;
        let value = if self.rng.random_bool(0.5) {
            avg + shift
        } else {
            avg - shift
        };
        value as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callcheck_core::timestamp_from_secs;
    use chrono::Duration;
    use std::collections::HashSet;

    fn small_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            num_agents: 5,
            day_start: timestamp_from_secs(0),
            day_seconds: 7_200,
            seed,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = CallGenerator::new(small_config(7)).unwrap().generate().unwrap();
        let b = CallGenerator::new(small_config(7)).unwrap().generate().unwrap();
        assert_eq!(a.calls, b.calls);
        assert_eq!(a.secret_agent, b.secret_agent);
        assert_eq!(a.imposter_count, b.imposter_count);
    }

    #[test]
    fn test_ids_are_sequential_and_unique() {
        let generated = CallGenerator::new(small_config(1)).unwrap().generate().unwrap();
        let ids: HashSet<_> = generated.calls.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), generated.calls.len());
        assert_eq!(ids.iter().min(), Some(&1));
        assert_eq!(ids.iter().max(), Some(&(generated.calls.len() as CallId)));
    }

    #[test]
    fn test_calls_stay_within_day_and_are_well_formed() {
        let config = small_config(3);
        let day_end = config.day_start + Duration::seconds(config.day_seconds);
        let generated = CallGenerator::new(config.clone()).unwrap().generate().unwrap();

        for call in &generated.calls {
            assert!(call.start >= config.day_start);
            assert!(call.start < day_end);
            assert!(call.start <= call.end);
            assert!(call.duration() <= Duration::seconds(600));
        }
    }

    #[test]
    fn test_without_imposters_every_agent_is_disjoint() {
        let config = GeneratorConfig {
            include_imposters: false,
            ..small_config(11)
        };
        let generated = CallGenerator::new(config).unwrap().generate().unwrap();
        assert_eq!(generated.imposter_count, 0);

        let mut calls = generated.calls;
        calls.sort_by(|a, b| a.agent_name.cmp(&b.agent_name).then(a.start.cmp(&b.start)));
        for pair in calls.windows(2) {
            if pair[0].agent_name == pair[1].agent_name {
                assert!(!pair[0].overlaps(&pair[1]), "{:?} / {:?}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_validation() {
        assert!(GeneratorConfig { num_agents: 0, ..small_config(0) }.validate().is_err());
        assert!(GeneratorConfig { day_seconds: 0, ..small_config(0) }.validate().is_err());
        assert!(GeneratorConfig { imposter_probability: 1.5, ..small_config(0) }.validate().is_err());
        assert!(GeneratorConfig { avg_call_secs: f64::NAN, ..small_config(0) }.validate().is_err());
        assert!(CallGenerator::new(GeneratorConfig { num_agents: 0, ..small_config(0) }).is_err());
    }

    #[test]
    fn test_averages_are_bounded_by_day_length() {
        let long_calls = GeneratorConfig {
            avg_call_secs: 1e18,
            day_seconds: 10,
            ..small_config(0)
        };
        assert!(long_calls.validate().is_err());
        assert!(CallGenerator::new(long_calls).is_err());

        let long_breaks = GeneratorConfig {
            avg_break_secs: 7_201.0,
            ..small_config(0)
        };
        assert!(long_breaks.validate().is_err());
        assert!(GeneratorConfig { day_seconds: MAX_DAY_SECONDS + 1, ..small_config(0) }.validate().is_err());
        assert!(GeneratorConfig { day_start: Timestamp::MAX_UTC, ..small_config(0) }.validate().is_err());
    }

    #[test]
    fn test_largest_valid_averages_generate() {
        let config = GeneratorConfig {
            num_agents: 2,
            day_seconds: 10,
            avg_call_secs: 10.0,
            avg_break_secs: 10.0,
            ..small_config(4)
        };
        let generated = CallGenerator::new(config).unwrap().generate().unwrap();
        assert!(!generated.calls.is_empty());
        assert!(generated.calls.iter().all(|c| c.start <= c.end));
    }
}
