use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn spendwise(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("spendwise").expect("binary exists");
    cmd.env("SPENDWISE_DATA_DIR", dir)
        .env_remove("SPENDWISE_LOG")
        .env_remove("SPENDWISE_AI_API_KEY");
    cmd
}

fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    spendwise(dir.path()).arg("init").assert().success();
    dir
}

#[test]
fn init_creates_settings_and_starter_categories() {
    let dir = TempDir::new().unwrap();
    spendwise(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialization complete"));

    assert!(dir.path().join("config.json").exists());

    spendwise(dir.path())
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(contains("Groceries").and(contains("Food & Dining")));
}

#[test]
fn config_shows_paths_and_base_currency() {
    let dir = initialized();
    spendwise(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(contains("Base currency:  USD"));
}

#[test]
fn account_lifecycle() {
    let dir = initialized();
    spendwise(dir.path())
        .args(["account", "create", "Checking", "--balance", "1500.00"])
        .assert()
        .success()
        .stdout(contains("Created account: Checking"));

    spendwise(dir.path())
        .args(["account", "create", "Visa", "-t", "credit", "-b", "250"])
        .assert()
        .success();

    spendwise(dir.path())
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(contains("Checking").and(contains("Visa")));

    spendwise(dir.path())
        .args(["report", "net-worth"])
        .assert()
        .success()
        .stdout(contains("1250.00"));
}

#[test]
fn added_transaction_is_categorized_by_merchant_rules() {
    let dir = initialized();
    spendwise(dir.path())
        .args(["transaction", "add", "STARBUCKS STORE 1234", "-5.75", "-d", "2025-03-04"])
        .assert()
        .success()
        .stdout(contains("Food & Dining"));

    spendwise(dir.path())
        .args(["txn", "list"])
        .assert()
        .success()
        .stdout(contains("1 transaction(s)"));
}

#[test]
fn import_skips_rows_already_imported() {
    let dir = initialized();
    let csv = dir.path().join("statement.csv");
    fs::write(
        &csv,
        "Date,Description,Amount\n\
         2025-03-01,NETFLIX.COM 866-579-7172,-15.99\n\
         2025-03-02,SHELL OIL 57444,-42.10\n\
         2025-03-03,PAYROLL ACME CORP,2500.00\n",
    )
    .unwrap();

    spendwise(dir.path())
        .arg("import")
        .arg(&csv)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("Columns: ").and(contains("3 new")));

    spendwise(dir.path())
        .arg("import")
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("Imported 3 transaction(s)"));

    spendwise(dir.path())
        .arg("import")
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("Imported 0 transaction(s)").and(contains("skipped 3 duplicate(s)")));

    spendwise(dir.path())
        .args(["report", "monthly", "--from", "2025-03-01", "--to", "2025-03-31"])
        .assert()
        .success()
        .stdout(contains("2025-03").and(contains("2500.00")));
}

#[test]
fn duplicates_scan_and_resolve() {
    let dir = initialized();
    for _ in 0..2 {
        spendwise(dir.path())
            .args(["transaction", "add", "NETFLIX.COM", "-15.99", "-d", "2025-02-03"])
            .assert()
            .success();
    }

    spendwise(dir.path())
        .args(["duplicates", "scan"])
        .assert()
        .success()
        .stdout(contains("Group 1").and(contains("1 duplicate(s) in 1 group(s)")));

    spendwise(dir.path())
        .args(["duplicates", "resolve"])
        .assert()
        .success()
        .stdout(contains("--yes"));

    spendwise(dir.path())
        .args(["duplicates", "resolve", "--yes"])
        .assert()
        .success()
        .stdout(contains("Deleted 1 duplicate transaction(s)"));

    spendwise(dir.path())
        .args(["duplicates", "scan"])
        .assert()
        .success()
        .stdout(contains("No duplicate transactions found."));
}

#[test]
fn budget_and_export() {
    let dir = initialized();
    spendwise(dir.path())
        .args(["budget", "create", "Groceries", "400", "--start", "2025-01-01"])
        .assert()
        .success()
        .stdout(contains("Created monthly budget for 'Groceries'"));

    let out = dir.path().join("backup.json");
    spendwise(dir.path())
        .args(["export", "all"])
        .arg(&out)
        .arg("--pretty")
        .assert()
        .success();

    let json = fs::read_to_string(&out).unwrap();
    assert!(json.contains("\"schema_version\""));
    assert!(json.contains("Groceries"));
}

#[test]
fn unknown_account_fails_with_exit_code_1() {
    let dir = initialized();
    spendwise(dir.path())
        .args(["account", "show", "Nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Account not found: Nope"));
}

#[test]
fn ai_commands_without_key_explain_how_to_configure() {
    let dir = initialized();
    spendwise(dir.path())
        .args(["ai", "categorize"])
        .assert()
        .failure()
        .stderr(contains("SPENDWISE_AI_API_KEY"));

    spendwise(dir.path())
        .args(["ai", "knowledge", "--json"])
        .assert()
        .success()
        .stdout(contains("\"base_currency\": \"USD\""));
}

#[test]
fn repeated_rows_in_one_file_reach_the_duplicate_scan() {
    let dir = initialized();
    let csv = dir.path().join("card.csv");
    fs::write(
        &csv,
        "Date,Description,Amount\n2025-03-01,Coffee,-4.50\n2025-03-01,Coffee,-4.50\n",
    )
    .unwrap();

    spendwise(dir.path())
        .arg("import")
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("Imported 2 transaction(s)"));

    spendwise(dir.path())
        .args(["duplicates", "scan"])
        .assert()
        .success()
        .stdout(contains("Group 1 (high confidence)"));
}
