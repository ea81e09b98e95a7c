use super::TestContext;
use predicates::prelude::*;

#[test]
fn test_manifests_merged_with_overrides() {
    let ctx = TestContext::new();
    ctx.create_package(
        &ctx.system_packages(),
        "base",
        r#"{"menu": {"index": {"label": "Base"}}, "debug": true}"#,
        &[],
    );
    std::fs::create_dir_all(ctx.temp.path().join("config")).unwrap();
    std::fs::write(
        ctx.temp.path().join("config/base.override.json"),
        r#"{"menu": {"index": {"label": "Renamed"}}, "debug": null}"#,
    )
    .unwrap();

    let output = ctx.shelf().arg("manifests").output().unwrap();
    assert!(output.status.success());

    let manifests: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        manifests,
        serde_json::json!({"base": {"menu": {"index": {"label": "Renamed"}}}})
    );
}

#[test]
fn test_bridges_in_priority_order() {
    let ctx = TestContext::new();
    ctx.create_package(&ctx.system_packages(), "low", r#"{"bridges": ["low"]}"#, &[]);
    ctx.create_package(
        &ctx.system_packages(),
        "high",
        r#"{"priority": 9, "bridges": ["high"]}"#,
        &[],
    );

    let output = ctx.shelf().arg("bridges").output().unwrap();
    assert!(output.status.success());

    let bridges: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(bridges, serde_json::json!(["high", "low"]));
}

#[test]
fn test_manifests_skip_rejected_packages() {
    let ctx = TestContext::new();
    ctx.create_package(
        &ctx.system_packages(),
        "future",
        r#"{"requires": {"shelf": "10000"}}"#,
        &[],
    );

    ctx.shelf()
        .arg("manifests")
        .assert()
        .success()
        .stdout(predicate::str::diff("{}\n"));
}
