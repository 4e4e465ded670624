//! callcheck CLI.
//!
//! Generate synthetic call input and run the conflict detection algorithms
//! over a CSV exchange file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use callcheck_cli::{
    init_tracing, run_all, run_detect, run_generate, run_scan, GeneratorConfig, TelemetryConfig,
};
use callcheck_core::CallcheckConfig;

#[derive(Parser)]
#[command(name = "callcheck")]
#[command(version, about = "Detect overlapping calls assigned to the same agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Call exchange file (overrides CALLCHECK_INPUT)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Conflicts output file (overrides CALLCHECK_CONFLICTS_OUTPUT)
    #[arg(long, global = true)]
    conflicts_output: Option<PathBuf>,

    /// Write conflicting pairs to the conflicts output file
    #[arg(long, global = true)]
    write_conflicts: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic call input.
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
    },

    /// Pairwise scan of the input file.
    Scan,

    /// Ordered per-agent detection over the input file.
    Detect {
        #[command(flatten)]
        detect: DetectArgs,
    },

    /// Generate input, then scan and detect it.
    Run {
        #[command(flatten)]
        generator: GeneratorArgs,
        #[command(flatten)]
        detect: DetectArgs,
    },
}

#[derive(clap::Args)]
struct GeneratorArgs {
    /// Number of agents
    #[arg(long, default_value = "75")]
    agents: usize,
    /// Random seed
    #[arg(long, env = "CALLCHECK_SEED", default_value = "42")]
    seed: u64,
    /// Chance that a secret-agent call is re-labelled
    #[arg(long, default_value = "0.1")]
    imposter_probability: f64,
    /// Generate conflict-free input
    #[arg(long)]
    no_imposters: bool,
}

impl GeneratorArgs {
    fn to_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            num_agents: self.agents,
            imposter_probability: self.imposter_probability,
            include_imposters: !self.no_imposters,
            seed: self.seed,
            ..GeneratorConfig::default()
        }
    }
}

#[derive(clap::Args)]
struct DetectArgs {
    /// Worker threads for the ordered detector (overrides CALLCHECK_WORKERS)
    #[arg(long)]
    workers: Option<usize>,
    /// Skip the timeline verification pass
    #[arg(long)]
    no_verify: bool,
}

impl DetectArgs {
    fn apply(&self, config: &mut CallcheckConfig) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.no_verify {
            config.verify_timelines = false;
        }
    }
}

fn print<T: Serialize + std::fmt::Display>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig::default();
    let telemetry = if cli.verbose { telemetry.verbose() } else { telemetry };
    init_tracing(&telemetry)?;

    let mut config = CallcheckConfig::from_env();
    if let Some(input) = &cli.input {
        config.input_path = input.clone();
    }
    if let Some(output) = &cli.conflicts_output {
        config.conflicts_path = output.clone();
    }
    if cli.write_conflicts {
        config.write_conflicts = true;
    }

    match &cli.command {
        Commands::Generate { generator } => {
            config.validate().context("invalid configuration")?;
            let summary = run_generate(&config, generator.to_config())?;
            print(&summary, cli.json)?;
        }

        Commands::Scan => {
            config.validate().context("invalid configuration")?;
            let summary = run_scan(&config)?;
            print(&summary, cli.json)?;
        }

        Commands::Detect { detect } => {
            detect.apply(&mut config);
            config.validate().context("invalid configuration")?;
            let summary = run_detect(&config)?;
            print(&summary, cli.json)?;
        }

        Commands::Run { generator, detect } => {
            detect.apply(&mut config);
            config.validate().context("invalid configuration")?;
            let summary = run_all(&config, generator.to_config())?;
            print(&summary, cli.json)?;
        }
    }

    Ok(())
}
