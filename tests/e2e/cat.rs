use super::TestContext;
use predicates::prelude::*;

#[test]
fn test_cat_negotiates_locale() {
    let ctx = TestContext::new();
    ctx.create_package(
        &ctx.system_packages(),
        "base",
        "{}",
        &[("po.js", "english"), ("po.de.js", "german")],
    );

    ctx.shelf()
        .args(["cat", "/base/po.js", "--locale", "de_DE"])
        .assert()
        .success()
        .stdout(predicate::str::diff("german"));

    ctx.shelf()
        .args(["cat", "/base/po.js"])
        .assert()
        .success()
        .stdout(predicate::str::diff("english"));
}

#[test]
fn test_cat_include_headers() {
    let ctx = TestContext::new();
    ctx.create_package(
        &ctx.system_packages(),
        "base",
        r#"{"content-security-policy": "img-src 'self'"}"#,
        &[("index.html", "<html></html>")],
    );

    ctx.shelf()
        .args(["cat", "/base/index.html", "--include"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("200 OK\n"))
        .stdout(predicate::str::contains("X-Shelf-Pkg-Checksum: "))
        .stdout(predicate::str::contains(
            "Content-Security-Policy: default-src 'self' http://localhost:9090;",
        ))
        .stdout(predicate::str::contains("img-src 'self'; block-all-mixed-content"))
        .stdout(predicate::str::ends_with("<html></html>"));
}

#[test]
fn test_cat_missing_fails() {
    let ctx = TestContext::new();
    ctx.create_package(&ctx.system_packages(), "base", "{}", &[]);

    ctx.shelf()
        .args(["cat", "/base/missing.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));

    ctx.shelf()
        .args(["cat", "/nosuch/index.html"])
        .assert()
        .failure();
}

#[test]
fn test_cat_checksum_matches_command() {
    let ctx = TestContext::new();
    ctx.create_package(&ctx.system_packages(), "base", "{}", &[("a.js", "a")]);

    let checksum = ctx.shelf().arg("checksum").output().unwrap();
    let served = ctx.shelf().args(["cat", "/checksum"]).output().unwrap();

    let checksum = String::from_utf8_lossy(&checksum.stdout).trim().to_string();
    assert_eq!(checksum.len(), 64);
    assert_eq!(String::from_utf8_lossy(&served.stdout), checksum);
}
