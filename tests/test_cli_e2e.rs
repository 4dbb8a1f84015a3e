mod common;

use common::PtyrunProcess;

// ============================================================================
// version command
// ============================================================================

#[test]
fn version_human() {
    let output = PtyrunProcess::spawn_command(&["version"]);
    assert!(
        output.status.success(),
        "version should exit 0: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.starts_with("ptyrun "),
        "version output should start with the binary name: {stdout}"
    );
    assert!(
        stdout.contains('.'),
        "version output should contain a version number: {stdout}"
    );
}

#[test]
fn version_json() {
    let output = PtyrunProcess::spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "ptyrun");
    assert!(parsed.get("version").is_some(), "missing version: {stdout}");
}

// ============================================================================
// completions command
// ============================================================================

#[test]
fn completions_bash() {
    let output = PtyrunProcess::spawn_command(&["completions", "bash"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("ptyrun"),
        "bash completions should reference ptyrun"
    );
    assert!(
        stdout.contains("headless"),
        "bash completions should list subcommands"
    );
}

#[test]
fn completions_zsh() {
    let output = PtyrunProcess::spawn_command(&["completions", "zsh"]);
    assert!(output.status.success());
    assert!(!output.stdout.is_empty());
}

// ============================================================================
// usage errors
// ============================================================================

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = PtyrunProcess::spawn_command(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn exec_without_command_is_usage_error() {
    let output = PtyrunProcess::spawn_command(&["exec"]);
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// --dry-run
// ============================================================================

#[test]
fn dry_run_prints_quoted_command() {
    let output = PtyrunProcess::spawn_command(&[
        "headless",
        "--dry-run",
        "--agent-bin",
        "/opt/agent/claude",
        "--permission-mode",
        "plan",
        "-p",
        "Return only the single word OK.",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim_end(),
        "/opt/agent/claude --permission-mode plan -p 'Return only the single word OK.'"
    );
}

#[test]
fn dry_run_json() {
    let output = PtyrunProcess::spawn_command(&[
        "exec",
        "--dry-run",
        "--format",
        "json",
        "--cwd",
        "/tmp",
        "--env",
        "MODE=ci",
        "--",
        "agent",
        "-p",
        "",
    ]);
    assert!(output.status.success());

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("dry-run JSON should be valid");
    assert_eq!(parsed["program"], "agent");
    assert_eq!(parsed["args"], serde_json::json!(["-p", ""]));
    assert_eq!(parsed["cwd"], "/tmp");
    assert_eq!(parsed["env"]["MODE"], "ci");
}

#[test]
fn dry_run_does_not_require_binary() {
    let output = PtyrunProcess::spawn_command(&[
        "headless",
        "--dry-run",
        "--agent-bin",
        "/nonexistent/ptyrun/claude",
    ]);
    assert!(output.status.success());
}
