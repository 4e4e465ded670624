//! End-to-end command tests over files in a temporary directory.

use callcheck_cli::{run_all, run_detect, run_scan, GeneratorConfig};
use callcheck_core::{timestamp_from_secs, CallcheckConfig};
use callcheck_test_utils::fixtures::*;
use std::fs;
use std::path::Path;

fn config_in(dir: &Path) -> CallcheckConfig {
    CallcheckConfig {
        input_path: dir.join("calls-input.csv"),
        conflicts_path: dir.join("conflicts.csv"),
        write_conflicts: true,
        ..CallcheckConfig::default()
    }
}

#[test]
fn detect_writes_candidate_then_existing_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    write_calls_csv(dir.path(), "calls-input.csv", &scenario_overlapping());

    let summary = run_detect(&config).expect("detect");
    assert_eq!(summary.conflicts, 1);
    assert_eq!(summary.accepted, Some(1));
    assert_eq!(summary.conflicts_written_to.as_deref(), Some(config.conflicts_path.as_path()));

    let text = fs::read_to_string(&config.conflicts_path).expect("conflicts file");
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec!["agentName,id,otherAgentName,otherId", "X,2,X,1"]
    );
}

#[test]
fn scan_writes_both_directions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    write_calls_csv(dir.path(), "calls-input.csv", &scenario_overlapping());

    let summary = run_scan(&config).expect("scan");
    assert_eq!(summary.conflicts, 2);
    assert_eq!(summary.distinct_pairs, 1);

    let text = fs::read_to_string(&config.conflicts_path).expect("conflicts file");
    assert_eq!(
        text.lines().skip(1).collect::<Vec<_>>(),
        vec!["X,1,X,2", "X,2,X,1"]
    );
}

#[test]
fn clean_scenarios_write_header_only() {
    for calls in [scenario_touching(), scenario_other_agent()] {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path());
        write_calls_csv(dir.path(), "calls-input.csv", &calls);

        assert_eq!(run_scan(&config).expect("scan").conflicts, 0);
        assert_eq!(run_detect(&config).expect("detect").conflicts, 0);
        assert_eq!(
            fs::read_to_string(&config.conflicts_path).expect("conflicts file").trim_end(),
            "agentName,id,otherAgentName,otherId"
        );
    }
}

#[test]
fn full_run_on_generated_day() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CallcheckConfig {
        workers: 4,
        ..config_in(dir.path())
    };
    let generator = GeneratorConfig {
        num_agents: 10,
        day_start: timestamp_from_secs(1_792_022_400),
        imposter_probability: 0.3,
        seed: 2026,
        ..GeneratorConfig::default()
    };

    let summary = run_all(&config, generator).expect("run");
    assert!(summary.generated.calls > 0);
    assert_eq!(summary.scan.conflicts % 2, 0);
    // Every ordered conflict is a real overlapping pair the scanner also sees.
    assert!(summary.detect.conflicts <= summary.scan.distinct_pairs);
    assert_eq!(
        summary.detect.accepted.map(|a| a + summary.detect.conflicts),
        Some(summary.generated.calls)
    );
    if summary.generated.imposter_count == 0 {
        assert_eq!(summary.scan.conflicts, 0);
    }

    let json = serde_json::to_value(&summary).expect("json");
    assert_eq!(json["detect"]["algorithm"], "ordered");
    assert!(json["scan"].get("accepted").is_none());
}

#[test]
fn malformed_input_fails_the_command() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    fs::write(&config.input_path, "id,agentName,start,end\n1,X,soon,later\n").expect("write");

    assert!(run_scan(&config).is_err());
    assert!(run_detect(&config).is_err());
    assert!(!config.conflicts_path.exists());
}
