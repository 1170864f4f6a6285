use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .join(name)
        .canonicalize()
        .expect("fixture present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("dstar-cli");
    cmd.env("RUST_LOG", "error")
        .env_remove("DSTAR_COST_ATTRIBUTE")
        .env_remove("DSTAR_DEFAULT_WEIGHT")
        .env_remove("DSTAR_STEP_LIMIT");
    cmd
}

#[test]
fn plan_prints_path_and_cost() {
    cli()
        .arg("plan")
        .arg("--scenario")
        .arg(fixture("diamond.json"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("path: A -> "))
        .stdout(predicate::str::contains("cost: 2\n"));
}

#[test]
fn replay_prints_plan_after_each_event() {
    cli()
        .arg("plan")
        .arg("--scenario")
        .arg(fixture("diamond.json"))
        .arg("--replay")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "after set cost B -> D to 10:\npath: A -> C -> D\ncost: 2\n",
        ))
        .stdout(predicate::str::contains(
            "after remove edge A -> C:\npath: A -> B -> D\ncost: 11\n",
        ));
}

#[test]
fn json_replay_follows_moving_source() {
    let output = cli()
        .arg("plan")
        .arg("--scenario")
        .arg(fixture("corridor.json"))
        .arg("--replay")
        .arg("--format")
        .arg("json")
        .output()
        .expect("runs");
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let reports = reports.as_array().expect("array of reports");
    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0]["cost"], 2.0);
    assert_eq!(reports[1]["cost"], 6.0);
    assert_eq!(reports[2]["source"], "North");
    assert_eq!(reports[2]["cost"], 4.0);
    assert_eq!(reports[3]["event"], "add edge North -> Goal (1)");
    assert_eq!(reports[3]["path"], serde_json::json!(["North", "Goal"]));
}

#[test]
fn unreachable_goal_is_reported_not_failed() {
    cli()
        .arg("plan")
        .arg("--scenario")
        .arg(fixture("isolated.json"))
        .assert()
        .success()
        .stdout("no path from Island to B\n");
}

#[test]
fn removed_goal_fails_with_friendly_message() {
    cli()
        .arg("plan")
        .arg("--scenario")
        .arg(fixture("goal-removed.json"))
        .arg("--replay")
        .assert()
        .failure()
        .stdout(predicate::str::contains("path: A -> B -> C"))
        .stderr(predicate::str::contains(
            "replanning failed after event 'remove node C'",
        ))
        .stderr(predicate::str::contains("goal C was removed from the graph"));
}

#[test]
fn misspelt_goal_suggests_declared_name() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("typo.json");
    fs::write(
        &path,
        r#"{"edges": [{"from": "Alpha", "to": "Beta"}], "source": "Alpha", "goal": "Betta"}"#,
    )
    .expect("write scenario");

    cli()
        .arg("plan")
        .arg("--scenario")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown node name: Betta"))
        .stderr(predicate::str::contains("Did you mean 'Beta'?"));
}

#[test]
fn missing_scenario_file_fails() {
    let dir = tempdir().expect("temp dir");
    cli()
        .arg("plan")
        .arg("--scenario")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load scenario"));
}

#[test]
fn json_logs_go_to_stderr() {
    cli()
        .env("RUST_LOG", "debug")
        .arg("--log-format")
        .arg("json")
        .arg("plan")
        .arg("--scenario")
        .arg(fixture("diamond.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("cost: 2"))
        .stdout(predicate::str::contains("\"level\"").not())
        .stderr(predicate::str::contains("\"level\":\"DEBUG\""));
}
