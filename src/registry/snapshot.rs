use super::roots::{search_roots, RootKind, SearchRoot};
use crate::channel::Channel;
use crate::config::Config;
use crate::package::{ChecksumEngine, OverrideSources, Package};
use crate::tree::TreeNode;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use shelf_core::core::ShelfResult;
use std::cmp::Reverse;
use tracing::{debug, warn};

pub const CHECKSUM_HEADER: &str = "X-Shelf-Pkg-Checksum";

const MANIFESTS_JS_HEAD: &str = r#"
            (function (root, data) {
                if (typeof define === 'function' && define.amd) {
                    define(data);
                }

                if (typeof shelf === 'object') {
                    shelf.manifests = data;
                } else {
                    root.manifests = data;
                }
            }(this, "#;
const MANIFESTS_JS_TAIL: &str = "))";

/// A package together with the kind of root it was found in
#[derive(Debug, Clone)]
pub struct Registered {
    pub kind: RootKind,
    pub package: Package,
}

/// The complete result of one load pass
///
/// Never modified once built; a reload builds a new one.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    packages: IndexMap<String, Registered>,
    checksum: Option<String>,
    manifests: String,
}

impl Snapshot {
    /// Discover, resolve and checksum every package the config points at
    ///
    /// Problems with single packages or override files are logged and
    /// skipped; they never fail the load.
    pub fn load(config: &Config) -> ShelfResult<Self> {
        let overrides = config.override_sources()?;
        let roots = search_roots(config)?;

        let mut loader = Loader {
            overrides: &overrides,
            runtime: &config.runtime_name,
            packages: IndexMap::new(),
            checksums: ChecksumEngine::new(),
        };

        for root in roots.iter().filter(|root| root.kind == RootKind::User) {
            loader.try_packages_dir(root);
        }

        // System content is only cacheable when the user has none of their own
        if loader.packages.is_empty() {
            loader.checksums.track();
        }

        for root in roots.iter().filter(|root| root.kind != RootKind::User) {
            loader.try_packages_dir(root);
        }

        let checksum = loader.checksums.finish();
        let manifests: Map<String, Value> = loader
            .packages
            .iter()
            .map(|(name, registered)| (name.clone(), registered.package.manifest().to_value()))
            .collect();
        let manifests = serde_json::to_string(&manifests)?;

        Ok(Self {
            packages: loader.packages,
            checksum,
            manifests,
        })
    }

    pub fn packages(&self) -> &IndexMap<String, Registered> {
        &self.packages
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name).map(|registered| &registered.package)
    }

    /// Aggregate content checksum, `None` when user content makes it unsafe to cache
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// JSON object mapping package names to their merged manifests
    pub fn manifests(&self) -> &str {
        &self.manifests
    }

    /// Bridges of all packages, highest priority package first
    pub fn get_bridges(&self) -> Vec<Value> {
        let mut packages: Vec<&Package> = self
            .packages
            .values()
            .map(|registered| &registered.package)
            .collect();
        packages.sort_by_key(|package| Reverse(package.priority()));

        packages
            .into_iter()
            .flat_map(|package| package.bridges().iter().cloned())
            .collect()
    }

    /// Answer a request for `path`
    ///
    /// `/manifests.js` and `/checksum` are served by the registry itself;
    /// anything else is `/<package>/<file>`.
    pub fn serve_file(&self, path: &str, channel: &mut dyn Channel) -> ShelfResult<()> {
        let Some(relative) = path.strip_prefix('/') else {
            debug!("refusing relative path {}", path);
            channel.http_error(404, "Not Found");
            return Ok(());
        };

        match &self.checksum {
            Some(checksum) => channel.push_header(CHECKSUM_HEADER, checksum),
            None => channel.push_header("Cache-Control", "no-cache, no-store"),
        }

        match path {
            "/manifests.js" => self.serve_manifests_js(channel),
            "/checksum" => self.serve_checksum(channel),
            _ if path.contains('*') => channel.http_error(404, "Not Found"),
            _ => {
                let (name, package_path) = relative.split_once('/').unwrap_or((relative, ""));
                match self.get(name) {
                    Some(package) => return package.serve_file(package_path, channel),
                    None => {
                        debug!("no package named {}", name);
                        channel.http_error(404, "Not Found");
                    }
                }
            }
        }

        Ok(())
    }

    fn serve_manifests_js(&self, channel: &mut dyn Channel) {
        channel.http_ok(Some("text/javascript"), Vec::new());
        let payload = format!("{}{}{}", MANIFESTS_JS_HEAD, self.manifests, MANIFESTS_JS_TAIL);
        channel.send_data(payload.as_bytes());
    }

    fn serve_checksum(&self, channel: &mut dyn Channel) {
        channel.http_ok(Some("text/plain"), Vec::new());
        if let Some(checksum) = &self.checksum {
            channel.send_data(checksum.as_bytes());
        }
    }
}

struct Loader<'a> {
    overrides: &'a OverrideSources,
    runtime: &'a str,
    packages: IndexMap<String, Registered>,
    checksums: ChecksumEngine,
}

impl Loader<'_> {
    fn try_packages_dir(&mut self, root: &SearchRoot) {
        let items = match root.node.directory_items() {
            Ok(items) => items,
            Err(e) if e.is_not_found() => {
                debug!("no packages in {}", root.node.display());
                return;
            }
            Err(e) => {
                warn!("{}: {}", root.node.display(), e);
                return;
            }
        };

        for item in items {
            if !item.is_dir() {
                continue;
            }

            let location = item.display();
            let package = match Package::load(item, self.overrides) {
                Ok(package) => package,
                Err(e) => {
                    debug!("skipping {}: {}", location, e);
                    continue;
                }
            };

            let at_least_prio = self
                .packages
                .get(package.name())
                .map(|existing| existing.package.priority());
            if !package.check(at_least_prio, self.runtime) {
                continue;
            }

            if let Err(e) = self.checksums.walk(&package) {
                warn!("skipping {}: {}", location, e);
                continue;
            }

            debug!("registered {} from {}", package.name(), location);
            self.packages.insert(
                package.name().to_string(),
                Registered {
                    kind: root.kind,
                    package,
                },
            );
        }
    }
}
