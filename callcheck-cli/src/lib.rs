//! callcheck CLI - Input Generation and Detection Driver
//!
//! Library half of the `callcheck` binary, so that commands can be exercised
//! from tests without spawning a process:
//! - [`generator`]: seeded synthetic call input with imposter calls
//! - [`commands`]: `generate`, `scan`, `detect` and `run`
//! - [`telemetry`]: tracing subscriber installation

pub mod commands;
pub mod generator;
pub mod telemetry;

pub use commands::{run_all, run_detect, run_generate, run_scan, DetectionSummary, GenerateSummary, RunSummary};
pub use generator::{CallGenerator, GeneratedCalls, GeneratorConfig};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};
