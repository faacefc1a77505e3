//! Integration tests for the `fleetdesk` CLI binary.
//!
//! Argument parsing, help output, shell completions, and error handling run
//! without a server; the remaining tests point the binary at a wiremock
//! instance.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fleetdesk` binary with env isolation.
///
/// Clears all `FLEETDESK_*` env vars and points config and data
/// directories at `home` so tests never touch the user's real files.
fn fleetdesk_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fleetdesk");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("FLEETDESK_PROFILE")
        .env_remove("FLEETDESK_API_URL")
        .env_remove("FLEETDESK_TOKEN")
        .env_remove("FLEETDESK_OUTPUT")
        .env_remove("FLEETDESK_INSECURE")
        .env_remove("FLEETDESK_TIMEOUT");
    cmd
}

fn fleetdesk_cmd() -> assert_cmd::Command {
    fleetdesk_cmd_in(Path::new("/tmp/fleetdesk-cli-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_list(server: &MockServer, resource: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{resource}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fleetdesk_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    fleetdesk_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("organizations")
            .and(predicate::str::contains("orgs"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("payments")),
    );
}

#[test]
fn test_version_flag() {
    fleetdesk_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleetdesk"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    fleetdesk_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    fleetdesk_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = fleetdesk_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_orgs_list_without_config() {
    let output = fleetdesk_cmd().args(["orgs", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("No API URL configured"), "{text}");
}

#[test]
fn test_orgs_list_without_token_exits_auth() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetdesk_cmd_in(home.path())
        .args(["--api-url", "http://127.0.0.1:1/", "orgs", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Not signed in"), "{text}");
}

#[test]
fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetdesk_cmd_in(home.path())
        .args(["--profile", "prod", "orgs", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("Profile 'prod' not found"));
}

// ── Session ─────────────────────────────────────────────────────────

#[test]
fn test_login_status_logout() {
    let home = tempfile::tempdir().unwrap();

    fleetdesk_cmd_in(home.path())
        .args(["auth", "login", "--access-token", "tok-123"])
        .assert()
        .success();

    let output = fleetdesk_cmd_in(home.path())
        .args(["-o", "json", "auth", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["authenticated"], json!(true));
    assert_eq!(status["profile"], json!("default"));

    fleetdesk_cmd_in(home.path())
        .args(["auth", "logout"])
        .assert()
        .success();
    fleetdesk_cmd_in(home.path())
        .args(["-o", "plain", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));
}

// ── Against a server ────────────────────────────────────────────────

#[tokio::test]
async fn test_orgs_list_renders_server_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organizations"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Acme Corp" },
            { "id": 2, "name": "Globex" },
            { "id": 1, "name": "Acme duplicate" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = fleetdesk_cmd_in(home.path());
    cmd.args(["--api-url", &server.uri(), "--token", "tok", "-o", "plain"])
        .args(["orgs", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1\n2");
}

#[tokio::test]
async fn test_orgs_list_search_filters() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        "organizations",
        json!([
            { "id": 1, "name": "Acme Corp" },
            { "id": 2, "name": "Globex" },
            { "id": 3, "name": "acme labs" }
        ]),
    )
    .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = fleetdesk_cmd_in(home.path());
    cmd.args(["--api-url", &server.uri(), "--token", "tok", "-o", "plain"])
        .args(["orgs", "list", "--search", "ACME"]);
    let output = run(cmd).await;

    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1\n3");
}

#[tokio::test]
async fn test_device_create_without_organizations() {
    let server = MockServer::start().await;
    mount_list(&server, "devices", json!([])).await;
    mount_list(&server, "organizations", json!([])).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = fleetdesk_cmd_in(home.path());
    cmd.args(["--api-url", &server.uri(), "--token", "tok"])
        .args(["devices", "create", "--name", "Gate sensor"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(
        combined_output(&output)
            .contains("No organizations exist yet: create a new organization first")
    );
}

#[tokio::test]
async fn test_delete_needs_yes_when_not_interactive() {
    let server = MockServer::start().await;
    mount_list(&server, "payments", json!([{ "id": 4, "reference": "INV-4" }])).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = fleetdesk_cmd_in(home.path());
    cmd.args(["--api-url", &server.uri(), "--token", "tok"])
        .args(["payments", "delete", "INV-4"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));
}

#[tokio::test]
async fn test_org_create_reports_success() {
    let server = MockServer::start().await;
    mount_list(&server, "organizations", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/organizations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "7" })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = fleetdesk_cmd_in(home.path());
    cmd.args(["--api-url", &server.uri(), "--token", "tok", "-o", "json"])
        .args(["orgs", "create", "--name", "Initech"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let created: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(created, json!({ "id": "7", "name": "Initech" }));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Organization created"));
}

#[tokio::test]
async fn test_server_rejection_message_is_shown() {
    let server = MockServer::start().await;
    mount_list(&server, "organizations", json!([{ "id": "1", "name": "Acme" }])).await;
    Mock::given(method("PUT"))
        .and(path("/organizations/1"))
        .respond_with(ResponseTemplate::new(409).set_body_string("name already taken"))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut cmd = fleetdesk_cmd_in(home.path());
    cmd.args(["--api-url", &server.uri(), "--token", "tok"])
        .args(["orgs", "rename", "Acme", "--name", "Globex"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("name already taken"));
}
