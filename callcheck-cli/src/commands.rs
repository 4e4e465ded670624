//! Command implementations behind the `callcheck` binary.
//!
//! Each command takes the resolved [`CallcheckConfig`] and returns a summary
//! that the binary prints as text or JSON.

use crate::generator::{CallGenerator, GeneratorConfig};
use anyhow::{Context, Result};
use callcheck_core::{CallcheckConfig, ConflictReport};
use callcheck_detect::{detect_partitioned, DetectionOutcome, OrderedDetector, PairwiseScanner};
use callcheck_storage::{CallSink, CallSource, ConflictSink, CsvCallSink, CsvCallSource, CsvConflictSink};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

// ============================================================================
// SUMMARIES
// ============================================================================

/// Outcome of `generate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummary {
    pub path: PathBuf,
    pub calls: usize,
    pub agents: usize,
    pub secret_agent: usize,
    pub imposter_count: usize,
    pub seed: u64,
}

impl fmt::Display for GenerateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generated {} calls for {} agents into {} (secret agent: agent_{}, imposter calls: {}, seed: {})",
            self.calls,
            self.agents,
            self.path.display(),
            self.secret_agent,
            self.imposter_count,
            self.seed
        )
    }
}

/// Outcome of one detection algorithm run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub algorithm: &'static str,
    pub conflicts: usize,
    pub distinct_pairs: usize,
    pub comparisons: u64,
    pub elapsed_ms: u64,
    /// Accepted calls, ordered detector only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts_written_to: Option<PathBuf>,
    #[serde(skip)]
    pub report: ConflictReport,
}

impl DetectionSummary {
    fn new(algorithm: &'static str, report: ConflictReport, started: Instant) -> Self {
        Self {
            algorithm,
            conflicts: report.count,
            distinct_pairs: report.distinct_pairs().len(),
            comparisons: report.comparisons,
            elapsed_ms: started.elapsed().as_millis() as u64,
            accepted: None,
            conflicts_written_to: None,
            report,
        }
    }
}

impl fmt::Display for DetectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: conflict count: {} ({} distinct pairs, {} comparisons, {} ms)",
            self.algorithm, self.conflicts, self.distinct_pairs, self.comparisons, self.elapsed_ms
        )?;
        if let Some(path) = &self.conflicts_written_to {
            write!(f, ", conflicts written to {}", path.display())?;
        }
        Ok(())
    }
}

/// Outcome of `run`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub generated: GenerateSummary,
    pub scan: DetectionSummary,
    pub detect: DetectionSummary,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.generated)?;
        writeln!(f, "{}", self.scan)?;
        write!(f, "{}", self.detect)
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Generate synthetic input and write it to the configured input path.
pub fn run_generate(config: &CallcheckConfig, generator: GeneratorConfig) -> Result<GenerateSummary> {
    let mut generator = CallGenerator::new(generator).context("invalid generator configuration")?;
    let generated = generator.generate().context("generating calls")?;

    let written = CsvCallSink::new(&config.input_path)
        .write_calls(&generated.calls)
        .context("writing generated calls")?;

    Ok(GenerateSummary {
        path: config.input_path.clone(),
        calls: written,
        agents: generator.config().num_agents,
        secret_agent: generated.secret_agent,
        imposter_count: generated.imposter_count,
        seed: generator.config().seed,
    })
}

/// Pairwise scan over the input file, replaying it per outer record.
pub fn run_scan(config: &CallcheckConfig) -> Result<DetectionSummary> {
    let summary = scan(config)?;
    finish(config, summary)
}

/// Ordered detection over the input file.
pub fn run_detect(config: &CallcheckConfig) -> Result<DetectionSummary> {
    let summary = detect(config)?;
    finish(config, summary)
}

/// Generate, scan, then detect. Only the ordered detector's conflicts are
/// written when conflict output is enabled.
pub fn run_all(config: &CallcheckConfig, generator: GeneratorConfig) -> Result<RunSummary> {
    let generated = run_generate(config, generator)?;
    let scan = scan(config)?;
    let detect = finish(config, detect(config)?)?;

    if scan.distinct_pairs != detect.conflicts {
        tracing::info!(
            scanner_pairs = scan.distinct_pairs,
            detector_conflicts = detect.conflicts,
            "algorithms disagree on pair count; a rejected call hides its later overlaps"
        );
    }

    Ok(RunSummary {
        generated,
        scan,
        detect,
    })
}

fn scan(config: &CallcheckConfig) -> Result<DetectionSummary> {
    let source = CsvCallSource::new(&config.input_path);
    let scanner = PairwiseScanner::with_agent_match(config.scan_agent_match);

    let started = Instant::now();
    let report = scanner
        .scan_source(&source)
        .with_context(|| format!("scanning {}", source.describe()))?;
    Ok(DetectionSummary::new("pairwise", report, started))
}

fn detect(config: &CallcheckConfig) -> Result<DetectionSummary> {
    let source = CsvCallSource::new(&config.input_path);

    let started = Instant::now();
    let outcome: DetectionOutcome = if config.workers > 1 {
        let calls = source
            .read_all()
            .with_context(|| format!("reading {}", source.describe()))?;
        detect_partitioned(calls, config.detect_agent_match, config.workers)
    } else {
        OrderedDetector::with_agent_match(config.detect_agent_match)
            .detect_source(&source)
            .with_context(|| format!("detecting over {}", source.describe()))?
    };

    if config.verify_timelines {
        outcome.verify().context("timeline verification failed")?;
    }

    let accepted = outcome.accepted_count();
    let mut summary = DetectionSummary::new("ordered", outcome.report, started);
    summary.accepted = Some(accepted);
    Ok(summary)
}

fn finish(config: &CallcheckConfig, mut summary: DetectionSummary) -> Result<DetectionSummary> {
    tracing::info!(algorithm = summary.algorithm, conflicts = summary.conflicts, "conflict count");
    if config.write_conflicts {
        CsvConflictSink::new(&config.conflicts_path)
            .write_conflicts(&summary.report)
            .context("writing conflicts")?;
        summary.conflicts_written_to = Some(config.conflicts_path.clone());
    }
    Ok(summary)
}
