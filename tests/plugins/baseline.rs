use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn psguard(dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_psguard"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to execute psguard")
}

fn psguard_ok(dir: &std::path::Path, args: &[&str]) -> String {
    let output = psguard(dir, args);
    assert!(
        output.status.success(),
        "psguard {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn record_suppresses_then_clear_restores() {
    let tmp = TempDir::new().expect("tempdir");
    psguard_ok(tmp.path(), &["init"]);
    fs::write(
        tmp.path().join("legacy.ps1"),
        "Invoke-Expression -Command $cmd\n",
    )
    .expect("write script");

    // Inherited debt fails the check...
    assert!(!psguard(tmp.path(), &["check"]).status.success());

    // ...until it is accepted into the baseline.
    let stdout = psguard_ok(tmp.path(), &["baseline", "record"]);
    assert!(stdout.contains("1 new finding(s) accepted"));
    psguard_ok(tmp.path(), &["check"]);

    // Re-recording is a no-op.
    let stdout = psguard_ok(tmp.path(), &["baseline", "record"]);
    assert!(stdout.contains("0 new finding(s) accepted"));

    // Clearing brings the debt back.
    let stdout = psguard_ok(tmp.path(), &["baseline", "clear"]);
    assert!(stdout.contains("1 entry(ies) removed"));
    assert!(!psguard(tmp.path(), &["check"]).status.success());
}

#[test]
fn baseline_does_not_hide_new_findings() {
    let tmp = TempDir::new().expect("tempdir");
    psguard_ok(tmp.path(), &["init"]);
    fs::write(
        tmp.path().join("legacy.ps1"),
        "Invoke-Expression -Command $cmd\n",
    )
    .expect("write script");
    psguard_ok(tmp.path(), &["baseline", "record"]);

    // A new violation in another file is still reported.
    fs::write(
        tmp.path().join("fresh.ps1"),
        "$p = ConvertTo-SecureString -String 'P@ss' -AsPlainText -Force\n",
    )
    .expect("write script");
    let output = psguard(tmp.path(), &["check"]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PSG010"));
    assert!(!stdout.contains("PSG005"), "baselined finding must stay hidden");
}

#[test]
fn no_baseline_flag_bypasses_suppression() {
    let tmp = TempDir::new().expect("tempdir");
    psguard_ok(tmp.path(), &["init"]);
    fs::write(
        tmp.path().join("legacy.ps1"),
        "Invoke-Expression -Command $cmd\n",
    )
    .expect("write script");
    psguard_ok(tmp.path(), &["baseline", "record"]);

    psguard_ok(tmp.path(), &["check"]);
    assert!(
        !psguard(tmp.path(), &["check", "--no-baseline"]).status.success()
    );
}

#[test]
fn list_exposes_entries_and_events_are_logged() {
    let tmp = TempDir::new().expect("tempdir");
    psguard_ok(tmp.path(), &["init"]);
    fs::write(tmp.path().join("w.ps1"), "iex $cmd\n").expect("write script");
    psguard_ok(tmp.path(), &["baseline", "record"]);

    let stdout = psguard_ok(tmp.path(), &["baseline", "list"]);
    let entries: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["rule_id"], "PSG005");
    assert_eq!(entries[0]["hash"].as_str().unwrap().len(), 64);

    // Every mutation lands in the audit trail.
    let events = fs::read_to_string(
        tmp.path().join(".psguard/data/baseline.events.jsonl"),
    )
    .expect("events log");
    let lines: Vec<&str> = events.lines().collect();
    assert_eq!(lines.len(), 1);
    let event: serde_json::Value = serde_json::from_str(lines[0]).expect("valid event");
    assert_eq!(event["op"], "baseline.record");
    assert_eq!(event["count"], 1);
    assert!(event["event_id"].is_string());
}

#[test]
fn baseline_survives_line_drift() {
    let tmp = TempDir::new().expect("tempdir");
    psguard_ok(tmp.path(), &["init"]);
    fs::write(tmp.path().join("drift.ps1"), "iex $cmd\n").expect("write script");
    psguard_ok(tmp.path(), &["baseline", "record"]);

    // Pushing the finding down the file must not resurface it: the
    // suppression hash is line-independent.
    fs::write(
        tmp.path().join("drift.ps1"),
        "Get-Item -Path $p\nGet-Item -Path $q\niex $cmd\n",
    )
    .expect("rewrite script");
    psguard_ok(tmp.path(), &["check"]);
}

#[test]
fn baseline_requires_initialized_project() {
    let tmp = TempDir::new().expect("tempdir");
    let output = psguard(tmp.path(), &["baseline", "list"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("psguard init"));
}
