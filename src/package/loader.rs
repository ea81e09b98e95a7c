//! Loading one package directory

use super::manifest::{Manifest, OverrideSources, LOCAL_OVERRIDE_FILE};
use crate::tree::{Node, TreeNode};
use serde_json::Value;
use shelf_core::core::{ShelfResult, SortKey};
use std::collections::BTreeSet;
use tracing::debug;

/// Priority of a package whose manifest does not declare one
pub const DEFAULT_PRIORITY: i64 = 1;

/// A package directory with its merged manifest
///
/// Built once per load pass and never changed afterwards. The file list is
/// captured at load time; files added later are not served until the next
/// reload.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    root: Node,
    manifest: Manifest,
    priority: i64,
    bridges: Vec<Value>,
    version: SortKey,
    files: BTreeSet<String>,
}

impl Package {
    /// Load the package in `root`
    ///
    /// The manifest is fully merged with every override before any other
    /// field is derived from it.
    pub fn load(root: Node, overrides: &OverrideSources) -> ShelfResult<Self> {
        let mut manifest = Manifest::read(&root)?;

        let dir_name = root.name().to_string();
        manifest.try_override_node(&root.join(LOCAL_OVERRIDE_FILE));
        manifest.try_override_file(&overrides.system_file(&dir_name));
        manifest.try_override_file(&overrides.user_file(&dir_name));

        let name = manifest.name().map(str::to_string).unwrap_or(dir_name);
        let priority = manifest.priority().unwrap_or(DEFAULT_PRIORITY);
        let bridges = manifest.bridges();

        let mut files = BTreeSet::new();
        for entry in root.glob("*")? {
            files.insert(entry.relative_to(&root)?);
        }

        Ok(Self {
            name,
            root,
            manifest,
            priority,
            bridges,
            version: SortKey::build(),
            files,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn bridges(&self) -> &[Value] {
        &self.bridges
    }

    pub fn version(&self) -> &SortKey {
        &self.version
    }

    /// Relative paths of every file and directory in the package
    pub fn files(&self) -> &BTreeSet<String> {
        &self.files
    }

    /// Decide whether this package may be registered
    ///
    /// `runtime` is the only package a manifest may list under `requires`,
    /// mapped to the minimum runtime version. `at_least_prio` is the
    /// priority of an already registered package with the same name; the
    /// new one only replaces it by declaring a strictly greater priority.
    pub fn check(&self, at_least_prio: Option<i64>, runtime: &str) -> bool {
        if let Some(requires) = self.manifest.requires() {
            let Some(requires) = requires.as_object() else {
                debug!("{}: 'requires' is not an object", self.name);
                return false;
            };

            if let Some(other) = requires.keys().find(|package| *package != runtime) {
                debug!("{}: requires unknown package '{}'", self.name, other);
                return false;
            }

            if let Some(wanted) = requires.get(runtime) {
                let Some(wanted) = wanted.as_str() else {
                    debug!("{}: required {} version is not a string", self.name, runtime);
                    return false;
                };
                if self.version < SortKey::new(wanted) {
                    debug!(
                        "{}: requires {} {}, this is {}",
                        self.name, runtime, wanted, self.version
                    );
                    return false;
                }
            }
        }

        if let Some(at_least_prio) = at_least_prio {
            match self.manifest.priority() {
                Some(priority) if priority > at_least_prio => {}
                _ => {
                    debug!(
                        "{}: shadowed by a package with priority {}",
                        self.name, at_least_prio
                    );
                    return false;
                }
            }
        }

        true
    }
}
