use crate::config::Config;
use crate::tree::{ArchiveNode, FsNode, Node, TreeNode};
use shelf_core::core::ShelfResult;
use std::fmt;
use tracing::warn;

/// Directory inside the bundle archive that holds packages
pub const BUNDLE_DIR: &str = "dist";

/// Where a search root comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// The user's data directory; its content is never checksummed
    User,
    /// The `dist/` directory of the bundle archive
    Bundle,
    /// One of the system data directories
    System,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootKind::User => write!(f, "user"),
            RootKind::Bundle => write!(f, "bundle"),
            RootKind::System => write!(f, "system"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRoot {
    pub kind: RootKind,
    pub node: Node,
}

/// Search roots in precedence order: user, bundle, then system directories
///
/// A bundle archive that cannot be opened is reported and left out.
/// Roots that do not exist are kept; walking them finds nothing.
pub fn search_roots(config: &Config) -> ShelfResult<Vec<SearchRoot>> {
    let mut roots = vec![SearchRoot {
        kind: RootKind::User,
        node: FsNode::new(config.user_packages_dir()?).into(),
    }];

    if let Some(archive) = config.bundle_archive() {
        match ArchiveNode::open(&archive) {
            Ok(root) => roots.push(SearchRoot {
                kind: RootKind::Bundle,
                node: root.join(BUNDLE_DIR).into(),
            }),
            Err(e) => warn!("ignoring bundle {}: {}", archive.display(), e),
        }
    }

    for dir in config.system_packages_dirs() {
        roots.push(SearchRoot {
            kind: RootKind::System,
            node: FsNode::new(dir).into(),
        });
    }

    Ok(roots)
}
