//! Sorted, name-based traversal over package trees
//!
//! Every walk in shelf goes through [`TreeNode::directory_items`], which
//! sorts the children of one directory by their own name. Sorting happens
//! per directory level, not on the full path. Package checksums depend on
//! this visiting order, so changing it changes every checksum.
//!
//! Two backings exist: [`FsNode`] for real directories and [`ArchiveNode`]
//! for the bundled zip archive. [`Node`] wraps either one so packages can
//! hold a root without caring where it lives.

mod archive;
mod fs;

pub use archive::ArchiveNode;
pub use fs::FsNode;

#[cfg(test)]
pub(crate) use archive::tests::write_zip;

use globset::{Glob, GlobMatcher};
use shelf_core::core::{ShelfError, ShelfResult};

/// Capability set shared by directory and archive trees
pub trait TreeNode: Clone + Sized {
    /// Final path component (empty for an archive root)
    fn name(&self) -> &str;

    /// Immediate children, in no particular order
    fn iter_children(&self) -> ShelfResult<Vec<Self>>;

    fn is_dir(&self) -> bool;

    fn is_file(&self) -> bool;

    fn read_bytes(&self) -> ShelfResult<Vec<u8>>;

    fn join(&self, name: &str) -> Self;

    /// Path of `self` below `ancestor`, `/`-separated
    fn relative_to(&self, ancestor: &Self) -> ShelfResult<String>;

    /// Human readable location for logs and listings
    fn display(&self) -> String;

    /// Immediate children sorted by name
    fn directory_items(&self) -> ShelfResult<Vec<Self>> {
        let mut items = self.iter_children()?;
        items.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(items)
    }

    /// Every entry below `self` whose name matches `pattern`
    ///
    /// Depth first, in [`directory_items`](TreeNode::directory_items) order.
    /// `pattern` is matched against the entry name only and may not contain
    /// a path separator.
    fn glob(&self, pattern: &str) -> ShelfResult<Vec<Self>> {
        let matcher = name_matcher(pattern)?;
        let mut found = Vec::new();
        collect_matches(self, &matcher, &mut found)?;
        Ok(found)
    }
}

fn collect_matches<N: TreeNode>(
    node: &N,
    matcher: &GlobMatcher,
    found: &mut Vec<N>,
) -> ShelfResult<()> {
    for item in node.directory_items()? {
        if matcher.is_match(item.name()) {
            found.push(item.clone());
        }
        if item.is_dir() {
            collect_matches(&item, matcher, found)?;
        }
    }
    Ok(())
}

pub(crate) fn name_matcher(pattern: &str) -> ShelfResult<GlobMatcher> {
    assert!(
        !pattern.contains('/'),
        "glob pattern must not contain a path separator: {}",
        pattern
    );
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ShelfError::Path(format!("Invalid glob pattern '{}': {}", pattern, e)))
}

/// A tree node from either backing
#[derive(Debug, Clone)]
pub enum Node {
    Fs(FsNode),
    Archive(ArchiveNode),
}

impl From<FsNode> for Node {
    fn from(node: FsNode) -> Self {
        Node::Fs(node)
    }
}

impl From<ArchiveNode> for Node {
    fn from(node: ArchiveNode) -> Self {
        Node::Archive(node)
    }
}

impl TreeNode for Node {
    fn name(&self) -> &str {
        match self {
            Node::Fs(node) => node.name(),
            Node::Archive(node) => node.name(),
        }
    }

    fn iter_children(&self) -> ShelfResult<Vec<Self>> {
        Ok(match self {
            Node::Fs(node) => node.iter_children()?.into_iter().map(Node::Fs).collect(),
            Node::Archive(node) => node
                .iter_children()?
                .into_iter()
                .map(Node::Archive)
                .collect(),
        })
    }

    fn is_dir(&self) -> bool {
        match self {
            Node::Fs(node) => node.is_dir(),
            Node::Archive(node) => node.is_dir(),
        }
    }

    fn is_file(&self) -> bool {
        match self {
            Node::Fs(node) => node.is_file(),
            Node::Archive(node) => node.is_file(),
        }
    }

    fn read_bytes(&self) -> ShelfResult<Vec<u8>> {
        match self {
            Node::Fs(node) => node.read_bytes(),
            Node::Archive(node) => node.read_bytes(),
        }
    }

    fn join(&self, name: &str) -> Self {
        match self {
            Node::Fs(node) => Node::Fs(node.join(name)),
            Node::Archive(node) => Node::Archive(node.join(name)),
        }
    }

    fn relative_to(&self, ancestor: &Self) -> ShelfResult<String> {
        match (self, ancestor) {
            (Node::Fs(node), Node::Fs(ancestor)) => node.relative_to(ancestor),
            (Node::Archive(node), Node::Archive(ancestor)) => node.relative_to(ancestor),
            _ => Err(ShelfError::Path(format!(
                "{} and {} are in different trees",
                self.display(),
                ancestor.display()
            ))),
        }
    }

    fn display(&self) -> String {
        match self {
            Node::Fs(node) => node.display(),
            Node::Archive(node) => node.display(),
        }
    }

    fn glob(&self, pattern: &str) -> ShelfResult<Vec<Self>> {
        Ok(match self {
            Node::Fs(node) => node.glob(pattern)?.into_iter().map(Node::Fs).collect(),
            Node::Archive(node) => node.glob(pattern)?.into_iter().map(Node::Archive).collect(),
        })
    }
}
