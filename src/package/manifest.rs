//! Package manifests and their override documents

use crate::tree::{Node, TreeNode};
use serde::Serialize;
use serde_json::{Map, Value};
use shelf_core::core::{ShelfError, ShelfResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const LOCAL_OVERRIDE_FILE: &str = "override.json";

/// Apply an RFC 7386 JSON merge patch to `target`
///
/// Neither input is modified; the merged document is returned. A patch
/// that is not an object replaces the target outright. Inside an object
/// patch, `null` deletes the key and any other value is merged
/// recursively into the current value for that key.
pub fn merge_patch(target: &Value, patch: &Value) -> Value {
    let Value::Object(patch) = patch else {
        return patch.clone();
    };

    let mut result = match target {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    for (name, value) in patch {
        if value.is_null() {
            result.shift_remove(name);
        } else {
            let merged = match result.get(name) {
                Some(current) => merge_patch(current, value),
                None => merge_patch(&Value::Null, value),
            };
            result.insert(name.clone(), merged);
        }
    }

    Value::Object(result)
}

/// Directories holding `<package-dir>.override.json` files
///
/// Overrides apply in increasing precedence: the package's own
/// `override.json`, then the system directory, then the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSources {
    pub system_dir: PathBuf,
    pub user_dir: PathBuf,
}

impl OverrideSources {
    fn file_name(package_dir: &str) -> String {
        format!("{}.override.json", package_dir)
    }

    pub fn system_file(&self, package_dir: &str) -> PathBuf {
        self.system_dir.join(Self::file_name(package_dir))
    }

    pub fn user_file(&self, package_dir: &str) -> PathBuf {
        self.user_dir.join(Self::file_name(package_dir))
    }
}

/// A package's merged `manifest.json`
///
/// Always a JSON object. Only a handful of keys mean anything to the
/// registry; everything else is passed through to clients untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    pub fn from_value(value: Value) -> ShelfResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ShelfError::Manifest(format!(
                "manifest must be a JSON object, not {}",
                json_kind(&other)
            ))),
        }
    }

    /// Read `manifest.json` from a package directory
    pub fn read(dir: &Node) -> ShelfResult<Self> {
        let file = dir.join(MANIFEST_FILE);
        let data = file.read_bytes().map_err(|e| {
            ShelfError::Manifest(format!("{}: {}", file.display(), e))
        })?;
        let value: Value = serde_json::from_slice(&data)
            .map_err(|e| ShelfError::Manifest(format!("{}: {}", file.display(), e)))?;
        Self::from_value(value)
    }

    /// Merge a patch document into this manifest
    ///
    /// Patches whose top level is not an object would replace the whole
    /// manifest with a non-object and are refused.
    pub fn apply_patch(&mut self, patch: &Value) -> ShelfResult<()> {
        if !patch.is_object() {
            return Err(ShelfError::Manifest(format!(
                "override must be a JSON object, not {}",
                json_kind(patch)
            )));
        }

        if let Value::Object(merged) = merge_patch(&Value::Object(self.0.clone()), patch) {
            self.0 = merged;
        }
        Ok(())
    }

    /// Apply the override file inside the package directory, if any
    pub fn try_override_node(&mut self, file: &Node) {
        self.try_override(file.read_bytes(), &file.display());
    }

    /// Apply a system or user override file, if any
    pub fn try_override_file(&mut self, path: &Path) {
        let data = fs::read(path).map_err(ShelfError::from);
        self.try_override(data, &path.display().to_string());
    }

    // Missing files are the usual case and stay silent. Anything else is a
    // user error: warn and keep the manifest as it was.
    fn try_override(&mut self, data: ShelfResult<Vec<u8>>, origin: &str) {
        let data = match data {
            Ok(data) => data,
            Err(e) if e.is_not_found() => return,
            Err(e) => {
                warn!("{}: {}", origin, e);
                return;
            }
        };

        let result = serde_json::from_slice::<Value>(&data)
            .map_err(ShelfError::from)
            .and_then(|patch| self.apply_patch(&patch));
        if let Err(e) = result {
            warn!("{}: {}", origin, e);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn priority(&self) -> Option<i64> {
        self.get("priority").and_then(Value::as_i64)
    }

    pub fn bridges(&self) -> Vec<Value> {
        self.get("bridges")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requires(&self) -> Option<&Value> {
        self.get("requires")
    }

    pub fn content_security_policy(&self) -> Option<&str> {
        self.get("content-security-policy").and_then(Value::as_str)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
