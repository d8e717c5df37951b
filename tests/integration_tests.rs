//! End-to-end campaign runs
//!
//! Runs the binary in mock mode against a temporary data directory and
//! inspects the artifacts it leaves behind.

mod common;

use std::fs;

use predicates::prelude::*;

use common::{count_files, read_json, TestEnvironment};

const TOPIC: &str = "AI workflow automation";

// ─────────────────────────────────────────────────────────────────
// Campaign Runs
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_campaign_without_variations() {
    let env = TestEnvironment::new();

    env.cmd()
        .arg(TOPIC)
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"))
        .stdout(predicate::str::contains("Performance (pass 1)"))
        .stdout(predicate::str::contains("Insight"));

    let dir = env.single_campaign();
    assert_eq!(count_files(&dir.join("content")), 4);
    assert_eq!(count_files(&dir.join("outcomes")), 4);
    assert!(dir.join("performance-1.json").is_file());
    assert!(dir.join("summary-1.json").is_file());
    assert!(!dir.join("performance-2.json").exists());
    assert!(!dir.join("improvements.json").exists());

    let log = read_json(&dir.join("campaign.json"));
    assert_eq!(log["status"], "completed");
    assert_eq!(log["mode"], "mock");
    assert_eq!(log["topic"], TOPIC);
    assert_eq!(log["content_ids"].as_array().unwrap().len(), 4);
    assert_eq!(log["outcome_ids"].as_array().unwrap().len(), 4);
    assert!(log["skipped"].as_array().unwrap().is_empty());

    let performance = read_json(&dir.join("performance-1.json"));
    let ranking = performance["ranking"].as_array().unwrap();
    assert_eq!(ranking.len(), 4);
    for id in log["content_ids"].as_array().unwrap() {
        assert!(ranking.contains(id));
        let rates = &performance["per_content_rates"][id.as_str().unwrap()];
        assert!(rates["open_rate"].is_number());
    }

    let summary = read_json(&dir.join("summary-1.json"));
    assert_eq!(summary["insight_source"], "fallback");
    assert!(!summary["insight_text"].as_str().unwrap().is_empty());
}

#[test]
fn test_campaign_with_variations() {
    let env = TestEnvironment::new();

    env.cmd()
        .args([TOPIC, "--variations"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Performance (pass 2)"))
        .stdout(predicate::str::contains("Improvement:"));

    let dir = env.single_campaign();
    assert_eq!(count_files(&dir.join("content")), 5);
    assert_eq!(count_files(&dir.join("outcomes")), 5);

    let first = read_json(&dir.join("performance-1.json"));
    let top = first["ranking"][0].as_str().unwrap().to_string();

    let improvements = read_json(&dir.join("improvements.json"));
    let improvement = &improvements[0];
    assert_eq!(improvement["source_content_id"], top.as_str());

    let new_id = improvement["new_content_id"].as_str().unwrap();
    let variant = read_json(&dir.join("content").join(format!("{}.json", new_id)));
    assert_eq!(variant["parent_variant_id"], top.as_str());

    // The source piece is untouched
    let source = read_json(&dir.join("content").join(format!("{}.json", top)));
    assert!(source["parent_variant_id"].is_null());

    let second = read_json(&dir.join("performance-2.json"));
    assert_eq!(second["ranking"][0], new_id);

    let summary = read_json(&dir.join("summary-1.json"));
    assert_eq!(improvement["feedback_used"], summary["insight_text"]);
}

#[test]
fn test_campaign_with_selected_personas() {
    let env = TestEnvironment::new();

    env.cmd()
        .args([TOPIC, "--persona", "founders", "-p", "creatives"])
        .assert()
        .success();

    let dir = env.single_campaign();
    assert_eq!(count_files(&dir.join("content")), 3);

    let log = read_json(&dir.join("campaign.json"));
    assert_eq!(log["persona_ids"], serde_json::json!(["founders", "creatives"]));
}

#[test]
fn test_interactive_campaign() {
    let env = TestEnvironment::new();

    env.cmd()
        .write_stdin(format!("{}\ny\n", TOPIC))
        .assert()
        .success()
        .stdout(predicate::str::contains("Campaign topic:"))
        .stdout(predicate::str::contains("[y/N]"));

    let dir = env.single_campaign();
    assert_eq!(count_files(&dir.join("content")), 5);
    assert!(dir.join("improvements.json").is_file());
}

#[test]
fn test_live_mode_without_credentials_falls_back() {
    let env = TestEnvironment::new();

    env.cmd()
        .args([TOPIC, "--mode", "live"])
        .assert()
        .success();

    let dir = env.single_campaign();
    let log = read_json(&dir.join("campaign.json"));
    assert_eq!(log["status"], "completed");
    assert_eq!(log["mode"], "mock");

    for entry in fs::read_dir(dir.join("outcomes")).unwrap() {
        let outcome = read_json(&entry.unwrap().path());
        assert_eq!(outcome["mode"], "mock");
    }
}

#[test]
fn test_mock_runs_reproducible() {
    let env = TestEnvironment::new();

    for _ in 0..2 {
        env.cmd().args([TOPIC, "-p", "operations"]).assert().success();
    }

    let dirs = env.campaign_dirs();
    assert_eq!(dirs.len(), 2);

    let clicks = |dir: &std::path::Path| {
        let perf = read_json(&dir.join("performance-1.json"));
        let mut clicked: Vec<u64> = perf["per_content_rates"]
            .as_object()
            .unwrap()
            .values()
            .map(|r| r["clicked"].as_u64().unwrap())
            .collect();
        clicked.sort_unstable();
        clicked
    };
    assert_eq!(clicks(&dirs[0]), clicks(&dirs[1]));
}

#[test]
fn test_persistence_failure_exit_code() {
    let env = TestEnvironment::new();
    // A plain file where the data directory should be
    fs::write(&env.data_dir, "not a directory").unwrap();

    env.cmd()
        .arg(TOPIC)
        .assert()
        .failure()
        .code(60)
        .stderr(predicate::str::contains("Partial campaign record kept"))
        .stderr(predicate::str::contains("E600"));
}

// ─────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_history_without_campaigns() {
    TestEnvironment::new()
        .cmd()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No stored campaigns"));
}

#[test]
fn test_history_compares_campaigns() {
    let env = TestEnvironment::new();
    env.cmd().arg(TOPIC).assert().success();
    env.cmd().args(["Remote team rituals", "-p", "founders"]).assert().success();

    let ids: Vec<String> = env
        .campaign_dirs()
        .iter()
        .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(ids.len(), 2);

    let assert = env.cmd().arg("history").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for id in &ids {
        assert!(stdout.contains(id.as_str()), "missing {} in {}", id, stdout);
    }
    assert!(stdout.contains("Persona trends"));
    assert!(stdout.contains("founders"));
    assert!(stdout.contains("general"));

    // Restricting to one campaign
    env.cmd()
        .args(["history", ids[1].as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(ids[1].as_str()))
        .stdout(predicate::str::contains(ids[0].as_str()).not());
}

#[test]
fn test_history_unknown_campaign() {
    TestEnvironment::new()
        .cmd()
        .args(["history", "campaign_19700101_000000_deadbeef"])
        .assert()
        .failure()
        .code(20);
}
