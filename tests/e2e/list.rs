use super::TestContext;
use predicates::prelude::*;

#[test]
fn test_list_empty() {
    let ctx = TestContext::new();

    ctx.shelf()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages found."))
        .stdout(predicate::str::contains("checksum = "));
}

#[test]
fn test_list_sorted_with_origin() {
    let ctx = TestContext::new();
    ctx.create_package(&ctx.system_packages(), "zeta", "{}", &[]);
    ctx.create_package(&ctx.system_packages(), "alpha", r#"{"priority": 4}"#, &[]);

    let output = ctx.shelf().arg("list").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let alpha = stdout.find("alpha").unwrap();
    let zeta = stdout.find("zeta").unwrap();
    assert!(alpha < zeta);
    assert!(stdout.contains("system"));
    assert!(stdout.contains("checksum = "));
}

#[test]
fn test_user_package_disables_checksum() {
    let ctx = TestContext::new();
    ctx.create_package(&ctx.system_packages(), "base", "{}", &[]);
    ctx.create_package(&ctx.user_packages(), "mine", "{}", &[]);

    ctx.shelf()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("mine"))
        .stdout(predicate::str::contains("user"))
        .stdout(predicate::str::contains("checksum = ").not());

    ctx.shelf()
        .arg("checksum")
        .assert()
        .success()
        .stdout(predicate::str::contains("No checksum"));
}

#[test]
fn test_bad_config_fails() {
    let ctx = TestContext::new();

    #[allow(deprecated)]
    let mut cmd = assert_cmd::Command::cargo_bin("shelf").unwrap();
    cmd.arg("--config")
        .arg(ctx.temp.path().join("missing.yaml"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
