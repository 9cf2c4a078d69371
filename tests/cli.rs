use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ynab-sensors").unwrap();
    cmd.env("YNAB_SENSORS_DATA_DIR", data_dir.path())
        .env_remove("YNAB_ACCESS_TOKEN")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("sensors"));
}

#[test]
fn test_config_shows_paths() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.path().to_string_lossy().as_ref()))
        .stdout(predicate::str::contains("Budgets:            0"));
}

#[test]
fn test_budget_list_empty() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["budget", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No budgets configured."));
}

#[test]
fn test_sensors_without_budgets_fails() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("sensors")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ynab-sensors setup"));
}

#[test]
fn test_sensors_from_settings_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{
            "schema_version": 2,
            "budgets": [{
                "budget_id": "b1",
                "budget_name": "Household",
                "instance_name": "Household",
                "access_token": "secret",
                "accepted_terms": true
            }]
        }"#,
    )
    .unwrap();

    cmd(&dir)
        .args(["sensors", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("last_successful_poll_ynab_Household"))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn test_newer_settings_file_still_runs_commands() {
    let dir = TempDir::new().unwrap();
    let contents = r#"{
        "schema_version": 9,
        "budgets": [{
            "budget_id": "b1",
            "budget_name": "Home",
            "instance_name": "Home",
            "access_token": "t",
            "accepted_terms": true
        }]
    }"#;
    std::fs::write(dir.path().join("config.json"), contents).unwrap();

    cmd(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Budgets:            1"))
        .stdout(predicate::str::contains("partially readable file"));

    cmd(&dir)
        .args(["budget", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Home"));

    let on_disk = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert_eq!(on_disk, contents);
}
