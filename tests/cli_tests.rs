use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn erpcli_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("erpcli"))
}

#[test]
fn test_help() {
    erpcli_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Command-line client for the Shiv Furniture ERP",
        ));
}

#[test]
fn test_version() {
    erpcli_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("erpcli"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized erpcli config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("downloads").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    // First init should succeed
    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    // Second init should fail
    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_products_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "products"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_list_requires_login() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "list", "sales-order"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_whoami_requires_login() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_without_session() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session"));
}

// Submission guards run before any network call, so they are testable with
// no server and no session.

#[test]
fn test_create_without_items_is_rejected_locally() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "sales-order",
            "--party",
            "cust-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No line items"));
}

#[test]
fn test_create_invalid_item_format() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "vendor-bill",
            "--party",
            "vend-1",
            "--item",
            "plywood",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid item format"));
}

#[test]
fn test_create_invalid_date() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "customer-invoice",
            "--party",
            "cust-1",
            "--item",
            "oak-table:2",
            "--date",
            "15-01-2026",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_create_rejects_unknown_kind() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "create",
            "credit-note",
            "--party",
            "cust-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_add_payment_rejects_nonpositive_amount() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "0",
            "--invoice",
            "inv-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_add_payment_requires_exactly_one_target() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("erpcli-config");

    erpcli_cmd()
        .args(["-C", config_path.to_str().unwrap(), "add-payment", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Exactly one of --invoice or --bill",
        ));

    erpcli_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-payment",
            "100",
            "--invoice",
            "inv-1",
            "--bill",
            "bill-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Exactly one of --invoice or --bill",
        ));
}
