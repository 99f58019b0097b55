#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const TRANSCRIPT: &str = "checking pods in prod\n\
===REPORT_START===\n\
{\"status\": \"fixed\", \"pod_count\": 12, \"error_count\": 3, \"fix_count\": 2}\n\
===REPORT_END===\n\
bye\n";

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("watch.md"), "watch the namespace").unwrap();
        fs::write(dir.path().join("transcript.txt"), TRANSCRIPT).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("watchlog").unwrap();
        cmd.env_remove("WATCHLOG_CONFIG")
            .env("RUST_LOG", "warn")
            .arg("--database")
            .arg(self.path("watchlog.db"))
            .arg("--results-dir")
            .arg(self.path("results"));
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let out = self.cmd().args(args).assert().success().get_output().stdout.clone();
        serde_json::from_slice(&out).expect("stdout should be JSON")
    }

    fn record(&self, namespace: &str) -> Value {
        let out = self
            .cmd()
            .args(["record", "-n", namespace, "--transcript"])
            .arg(self.path("transcript.txt"))
            .arg("--prompt")
            .arg(self.path("watch.md"))
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).unwrap()
    }
}

fn artifact_count(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|it| {
            it.filter_map(Result::ok)
                .filter(|e| e.file_name().to_string_lossy().starts_with("run_"))
                .count()
        })
        .unwrap_or(0)
}

#[test]
fn extract_prints_report_fields() {
    let env = Env::new();
    let v = env.json(&["extract", env.path("transcript.txt").to_str().unwrap()]);
    assert_eq!(v["status"], "fixed");
    assert_eq!(v["pod_count"], 12);
    assert_eq!(v["error_count"], 3);
    assert_eq!(v["fix_count"], 2);
}

#[test]
fn extract_reads_stdin() {
    let env = Env::new();
    env.cmd()
        .args(["extract", "-"])
        .write_stdin("no markers here")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"ok\""));
}

#[test]
fn record_import_query_round() {
    let env = Env::new();
    let run = env.record("prod");
    assert_eq!(run["status"], "fixed");
    assert_eq!(artifact_count(&env.path("results")), 1);
    let id = run["id"].as_i64().unwrap();

    let first = env.json(&["import"]);
    assert_eq!(first["imported"], 1);
    let second = env.json(&["import"]);
    assert_eq!(second["imported"], 0);
    assert_eq!(second["duplicates"], 1);
    assert_eq!(second["skipped"], 1);

    let runs = env.json(&["runs", "-n", "prod"]);
    assert_eq!(runs.as_array().unwrap().len(), 1);
    assert_eq!(runs[0]["id"], id);

    let shown = env.json(&["show", &id.to_string()]);
    assert_eq!(shown["run"]["pod_count"], 12);
    assert!(shown["fixes"].as_array().unwrap().is_empty());

    let last = env.json(&["last-run", "-n", "prod"]);
    assert_eq!(last["namespace"], "prod");
    assert!(last["last_completed"].is_string());

    let stats = env.json(&["namespaces"]);
    assert_eq!(stats[0]["namespace"], "prod");
    assert_eq!(stats[0]["fixed_count"], 1);

    let global = env.json(&["stats"]);
    assert_eq!(global["total"], 0);
}

#[test]
fn record_with_import_flag_lands_in_database() {
    let env = Env::new();
    env.cmd()
        .args(["record", "-n", "staging", "--import", "--transcript"])
        .arg(env.path("transcript.txt"))
        .arg("--prompt")
        .arg(env.path("watch.md"))
        .assert()
        .success();

    let runs = env.json(&["runs"]);
    assert_eq!(runs[0]["namespace"], "staging");
}

#[test]
fn missing_prompt_records_failed_run() {
    let env = Env::new();
    let out = env
        .cmd()
        .args(["record", "-n", "prod", "--transcript"])
        .arg(env.path("transcript.txt"))
        .arg("--prompt")
        .arg(env.path("nope.md"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let run: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(run["status"], "failed");
    assert_eq!(artifact_count(&env.path("results")), 1);
}

#[test]
fn every_subcommand_has_help_text() {
    let env = Env::new();
    env.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Print the watchlog version"));
}

#[test]
fn show_unknown_run_exits_not_found() {
    let env = Env::new();
    env.cmd()
        .args(["show", "12345"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn missing_config_file_is_config_error() {
    let env = Env::new();
    env.cmd()
        .arg("--config")
        .arg(env.path("absent.yaml"))
        .arg("stats")
        .assert()
        .code(2);
}

#[test]
fn config_file_supplies_paths() {
    let env = Env::new();
    let cfg = env.path("watchlog.yaml");
    fs::write(
        &cfg,
        format!(
            "database: {}\nresults_dir: {}\nprompt_path: {}\n",
            env.path("other.db").display(),
            env.path("other-results").display(),
            env.path("watch.md").display()
        ),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("watchlog").unwrap();
    cmd.env("WATCHLOG_CONFIG", &cfg)
        .env_remove("WATCHLOG_DATABASE")
        .env_remove("WATCHLOG_RESULTS_DIR")
        .args(["record", "-n", "prod", "--transcript"])
        .arg(env.path("transcript.txt"))
        .assert()
        .success();

    assert_eq!(artifact_count(&env.path("other-results")), 1);
}
