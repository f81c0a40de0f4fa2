use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn vaad(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vaad").unwrap();
    cmd.env("HOME", home);
    cmd
}

fn init_workspace(home: &Path) -> std::path::PathBuf {
    let data_dir = home.join("data");
    vaad(home)
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success();
    data_dir
}

fn write_statement(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("stmt.csv");
    let content = "\
תנועות בחשבון 12-637-388838
,,,,,
תאריך,פרטים,אסמכתא,חובה,זכות,עבור
2/11/2025,בוצע ע\"י: ניצנה ומרדכי גז,7701234,,400.00,ועד בית
3/11/2025,חיוב חשמל,7701235,120.00,,ועד בית
";
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn init_creates_database() {
    let home = tempfile::tempdir().unwrap();
    let data_dir = init_workspace(home.path());
    assert!(data_dir.join("vaad.db").exists());

    vaad(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tenants:     0"));
}

#[test]
fn statement_flow_records_and_stays_idempotent() {
    let home = tempfile::tempdir().unwrap();
    init_workspace(home.path());

    vaad(home.path())
        .args([
            "tenants",
            "add",
            "76",
            "גז",
            "--alt-names",
            "ניצנה גז,מרדכי גז",
        ])
        .assert()
        .success();

    let stmt = write_statement(home.path());
    vaad(home.path())
        .args(["process", stmt.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 recorded"));

    vaad(home.path())
        .arg("grid")
        .assert()
        .success()
        .stdout(predicate::str::contains("נובמבר 2025"))
        .stdout(predicate::str::contains("76"));

    // same file again: the processed set makes the run a no-op
    vaad(home.path())
        .args(["process", stmt.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 skipped"));

    vaad(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed:   1"))
        .stdout(predicate::str::contains("Receipts:    1"));
}

#[test]
fn classify_reports_apartment_number_match() {
    let home = tempfile::tempdir().unwrap();
    init_workspace(home.path());
    vaad(home.path())
        .args(["tenants", "add", "53", "כהן"])
        .assert()
        .success();

    vaad(home.path())
        .args(["classify", "העברה עבור דירה 53"])
        .assert()
        .success()
        .stdout(predicate::str::contains("regex_apt_number"))
        .stdout(predicate::str::contains("53"));
}

#[test]
fn record_rejects_unknown_apartment() {
    let home = tempfile::tempdir().unwrap();
    init_workspace(home.path());

    vaad(home.path())
        .args(["record", "--apartment", "99", "--amount", "400"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown apartment"));
}

#[test]
fn unmatched_transaction_can_be_resolved() {
    let home = tempfile::tempdir().unwrap();
    init_workspace(home.path());
    vaad(home.path())
        .args(["tenants", "add", "76", "גז"])
        .assert()
        .success();

    let stmt = home.path().join("stmt.csv");
    std::fs::write(
        &stmt,
        "\
תאריך,פרטים,אסמכתא,חובה,זכות,עבור
2/11/2025,העברה מפלוני אלמוני,7709999,,400.00,ועד בית
",
    )
    .unwrap();

    vaad(home.path())
        .args(["process", stmt.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 unmatched"));

    vaad(home.path())
        .arg("unmatched")
        .assert()
        .success()
        .stdout(predicate::str::contains("פלוני"));

    vaad(home.path())
        .args(["resolve", "1", "--apartment", "76"])
        .assert()
        .success()
        .stdout(predicate::str::contains("76"));

    vaad(home.path())
        .arg("unmatched")
        .assert()
        .success()
        .stdout(predicate::str::contains("No unmatched transactions."));
}
