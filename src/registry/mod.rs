//! The package registry
//!
//! # Resolution
//!
//! Search roots are walked user first, then the bundle archive, then each
//! system data directory. Within a root, package directories are visited in
//! name order. A package whose name is already registered only replaces the
//! earlier one if its manifest declares a strictly greater `priority`.
//!
//! # Checksum
//!
//! Every accepted system or bundle package is walked into one SHA-256
//! context, in acceptance order. If the user directory contributed any
//! package the checksum is dropped: user content changes without notice
//! and must not be cached.
//!
//! # Reloading
//!
//! All state lives in an immutable [`Snapshot`]. A reload builds a complete
//! new snapshot off to the side and publishes it with a single atomic
//! store, so readers see either the old registry or the new one.

mod roots;
mod snapshot;

pub use roots::{search_roots, RootKind, SearchRoot, BUNDLE_DIR};
pub use snapshot::{Registered, Snapshot, CHECKSUM_HEADER};

use crate::channel::Channel;
use crate::config::Config;
use arc_swap::ArcSwap;
use serde_json::Value;
use shelf_core::core::ShelfResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub struct PackageRegistry {
    config: Config,
    current: ArcSwap<Snapshot>,
    saw_first_reload_hint: AtomicBool,
}

impl PackageRegistry {
    /// Create the registry and run the first load
    pub fn new(config: Config) -> ShelfResult<Self> {
        let snapshot = Snapshot::load(&config)?;
        log_loaded(&snapshot);
        Ok(Self {
            config,
            current: ArcSwap::from_pointee(snapshot),
            saw_first_reload_hint: AtomicBool::new(false),
        })
    }

    /// The current snapshot; stays valid across later reloads
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Rebuild everything from disk and swap the result in
    ///
    /// On error the previous snapshot stays in place.
    pub fn reload(&self) -> ShelfResult<()> {
        let snapshot = Snapshot::load(&self.config)?;
        log_loaded(&snapshot);
        self.current.store(Arc::new(snapshot));
        Ok(())
    }

    /// Reload, except on the first call
    ///
    /// Clients send a hint every time they start. The first one arrives
    /// right after the registry was created, so reloading then would only
    /// repeat the initial load.
    pub fn reload_hint(&self) -> ShelfResult<()> {
        if self.saw_first_reload_hint.swap(true, Ordering::SeqCst) {
            self.reload()?;
        }
        Ok(())
    }

    /// Serialized `name -> manifest` map of the current snapshot
    pub fn manifests(&self) -> String {
        self.current.load().manifests().to_string()
    }

    pub fn checksum(&self) -> Option<String> {
        self.current.load().checksum().map(str::to_string)
    }

    pub fn get_bridges(&self) -> Vec<Value> {
        self.current.load().get_bridges()
    }

    pub fn serve_file(&self, path: &str, channel: &mut dyn Channel) -> ShelfResult<()> {
        self.snapshot().serve_file(path, channel)
    }
}

fn log_loaded(snapshot: &Snapshot) {
    info!(
        "loaded {} package(s), checksum {}",
        snapshot.packages().len(),
        snapshot.checksum().unwrap_or("disabled")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ResponseBuffer;
    use crate::package::loader::tests::write_package;
    use crate::tree::write_zip;
    use serde_json::json;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const ORIGIN: &str = "http://localhost:9090";

    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                temp: TempDir::new().unwrap(),
            }
        }

        fn user(&self) -> PathBuf {
            self.temp.path().join("home/shelf")
        }

        fn system(&self, n: usize) -> PathBuf {
            self.temp.path().join(format!("sys{}/shelf", n))
        }

        fn bundle(&self) -> PathBuf {
            self.temp.path().join("bundle.zip")
        }

        fn config(&self) -> Config {
            let base = self.temp.path();
            Config {
                user_data_dir: Some(base.join("home").display().to_string()),
                system_data_dirs: Some(vec![
                    base.join("sys1").display().to_string(),
                    base.join("sys2").display().to_string(),
                ]),
                system_config_dir: Some(base.join("etc").display().to_string()),
                user_config_dir: Some(base.join("config").display().to_string()),
                bundle_archive: Some(self.bundle().display().to_string()),
                ..Default::default()
            }
        }

        fn registry(&self) -> PackageRegistry {
            PackageRegistry::new(self.config()).unwrap()
        }
    }

    fn package(dir: &Path, manifest: &str) {
        write_package(dir, manifest, &[("index.html", "<html>")]);
    }

    #[test]
    fn test_empty_registry() {
        let fixture = Fixture::new();
        let registry = fixture.registry();

        let snapshot = registry.snapshot();
        assert!(snapshot.packages().is_empty());
        assert_eq!(registry.manifests(), "{}");
        // Nothing from the user, so an (empty) checksum exists
        assert_eq!(
            registry.checksum().as_deref(),
            Some("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn test_higher_root_wins_without_priority() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("base"), r#"{"tag": "first"}"#);
        package(&fixture.system(2).join("base"), r#"{"tag": "second"}"#);

        let snapshot = fixture.registry().snapshot();
        let base = snapshot.get("base").unwrap();
        assert_eq!(base.manifest().get("tag").unwrap(), "first");
    }

    #[test]
    fn test_lower_root_wins_with_greater_priority() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("base"), r#"{"tag": "first", "priority": 2}"#);
        package(&fixture.system(2).join("base"), r#"{"tag": "second", "priority": 3}"#);
        package(&fixture.system(2).join("other"), r#"{"name": "base", "priority": 3}"#);

        let snapshot = fixture.registry().snapshot();
        let base = snapshot.get("base").unwrap();
        // "base" dir is visited before "other" and wins the equal-priority tie
        assert_eq!(base.manifest().get("tag").unwrap(), "second");
        assert_eq!(snapshot.packages().len(), 1);
    }

    #[test]
    fn test_version_gate() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("future"), r#"{"requires": {"shelf": "301"}}"#);
        package(&fixture.system(1).join("current"), r#"{"requires": {"shelf": "300"}}"#);
        package(&fixture.system(1).join("foreign"), r#"{"requires": {"other": "1"}}"#);

        let snapshot = fixture.registry().snapshot();
        let names: Vec<&String> = snapshot.packages().keys().collect();
        assert_eq!(names, vec!["current"]);
    }

    #[test]
    fn test_broken_manifest_skipped() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("broken"), "{");
        package(&fixture.system(1).join("fine"), "{}");
        fs::create_dir_all(fixture.system(1).join("no-manifest")).unwrap();
        fs::write(fixture.system(1).join("stray-file"), "x").unwrap();

        let snapshot = fixture.registry().snapshot();
        let names: Vec<&String> = snapshot.packages().keys().collect();
        assert_eq!(names, vec!["fine"]);
    }

    #[test]
    fn test_user_content_suppresses_checksum() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("base"), "{}");
        package(&fixture.system(2).join("system"), "{}");
        assert!(fixture.registry().checksum().is_some());

        package(&fixture.user().join("mine"), "{}");
        let registry = fixture.registry();
        assert_eq!(registry.checksum(), None);
        assert_eq!(registry.snapshot().packages().len(), 3);
        assert_eq!(
            registry.snapshot().packages()["mine"].kind,
            RootKind::User
        );
    }

    #[test]
    fn test_checksum_tracks_content() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("base"), "{}");
        let registry = fixture.registry();
        let before = registry.checksum().unwrap();

        registry.reload().unwrap();
        assert_eq!(registry.checksum().unwrap(), before);

        fs::write(fixture.system(1).join("base/index.html"), "<html>changed").unwrap();
        registry.reload().unwrap();
        assert_ne!(registry.checksum().unwrap(), before);
    }

    #[test]
    fn test_bundle_root() {
        let fixture = Fixture::new();
        write_zip(
            &fixture.bundle(),
            &[
                ("dist/bundled/manifest.json", r#"{"tag": "bundle"}"#),
                ("dist/bundled/po/po.de.js", "de"),
                ("dist/shared/manifest.json", r#"{"tag": "bundle"}"#),
            ],
        );
        package(&fixture.system(1).join("shared"), r#"{"tag": "system"}"#);

        let registry = fixture.registry();
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.packages()["bundled"].kind, RootKind::Bundle);
        assert_eq!(
            snapshot.get("shared").unwrap().manifest().get("tag").unwrap(),
            "bundle"
        );

        let mut channel = ResponseBuffer::new(ORIGIN).with_header("Accept-Language", "de");
        registry.serve_file("/bundled/po/po.js", &mut channel).unwrap();
        assert!(channel.is_ok());
        assert_eq!(channel.body_text(), "de");
    }

    #[test]
    fn test_system_override_applied() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("base"), r#"{"priority": 1, "x": 1}"#);
        fs::create_dir_all(fixture.temp.path().join("etc")).unwrap();
        fs::write(
            fixture.temp.path().join("etc/base.override.json"),
            r#"{"x": null, "y": 2}"#,
        )
        .unwrap();

        let manifests: serde_json::Value =
            serde_json::from_str(&fixture.registry().manifests()).unwrap();
        assert_eq!(manifests, json!({"base": {"priority": 1, "y": 2}}));
    }

    #[test]
    fn test_bridges_by_priority() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("a"), r#"{"bridges": ["a1", "a2"]}"#);
        package(&fixture.system(1).join("b"), r#"{"priority": 5, "bridges": ["b1"]}"#);
        package(&fixture.system(1).join("c"), r#"{"bridges": ["c1"]}"#);
        package(&fixture.system(1).join("d"), r#"{"priority": -1, "bridges": ["d1"]}"#);

        assert_eq!(
            fixture.registry().get_bridges(),
            vec![json!("b1"), json!("a1"), json!("a2"), json!("c1"), json!("d1")]
        );
    }

    #[test]
    fn test_reload_hint_skips_first_call() {
        let fixture = Fixture::new();
        let registry = fixture.registry();
        package(&fixture.system(1).join("late"), "{}");

        registry.reload_hint().unwrap();
        assert!(registry.snapshot().get("late").is_none());

        registry.reload_hint().unwrap();
        assert!(registry.snapshot().get("late").is_some());
    }

    #[test]
    fn test_old_snapshot_survives_reload() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("base"), "{}");
        let registry = fixture.registry();
        let old = registry.snapshot();

        fs::remove_dir_all(fixture.system(1).join("base")).unwrap();
        registry.reload().unwrap();

        assert!(old.get("base").is_some());
        assert!(registry.snapshot().get("base").is_none());
    }

    #[test]
    fn test_serve_checksum_and_manifests() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("base"), r#"{"name": "base"}"#);
        let registry = fixture.registry();
        let checksum = registry.checksum().unwrap();

        let mut channel = ResponseBuffer::new(ORIGIN);
        registry.serve_file("/checksum", &mut channel).unwrap();
        assert!(channel.is_ok());
        assert_eq!(channel.body_text(), checksum);
        assert_eq!(
            channel.response_header(CHECKSUM_HEADER),
            Some(checksum.as_str())
        );

        let mut channel = ResponseBuffer::new(ORIGIN);
        registry.serve_file("/manifests.js", &mut channel).unwrap();
        assert_eq!(
            channel.response_header("Content-Type"),
            Some("text/javascript")
        );
        let body = channel.body_text();
        assert!(body.contains("define(data);"));
        assert!(body.trim_end().ends_with(r#"{"base":{"name":"base"}}))"#));
    }

    #[test]
    fn test_serve_without_checksum_is_not_cacheable() {
        let fixture = Fixture::new();
        package(&fixture.user().join("mine"), "{}");
        let registry = fixture.registry();

        let mut channel = ResponseBuffer::new(ORIGIN);
        registry.serve_file("/checksum", &mut channel).unwrap();
        assert!(channel.is_ok());
        assert!(channel.body.is_empty());
        assert_eq!(
            channel.response_header("Cache-Control"),
            Some("no-cache, no-store")
        );
        assert!(channel.response_header(CHECKSUM_HEADER).is_none());
    }

    #[test]
    fn test_serve_not_found_cases() {
        let fixture = Fixture::new();
        package(&fixture.system(1).join("base"), "{}");
        let registry = fixture.registry();

        for path in ["/base/*.html", "/unknown/index.html", "/base/missing.js", "base/index.html"] {
            let mut channel = ResponseBuffer::new(ORIGIN);
            registry.serve_file(path, &mut channel).unwrap();
            assert_eq!(channel.status, Some(404), "{}", path);
        }

        let mut channel = ResponseBuffer::new(ORIGIN);
        registry.serve_file("/base/index.html", &mut channel).unwrap();
        assert!(channel.is_ok());
    }

    #[test]
    fn test_serve_skips_directory_named_like_variant() {
        let fixture = Fixture::new();
        write_package(
            &fixture.system(1).join("base"),
            "{}",
            &[("app.js/inner.txt", "inner"), ("app.min.js", "minified")],
        );
        let registry = fixture.registry();

        let mut channel = ResponseBuffer::new(ORIGIN);
        registry.serve_file("/base/app.js", &mut channel).unwrap();
        assert_eq!(channel.status, Some(200));
        assert_eq!(channel.body_text(), "minified");
    }
}
