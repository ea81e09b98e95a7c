use super::loader::Package;
use crate::tree::{Node, TreeNode};
use sha2::{Digest, Sha256};
use shelf_core::core::ShelfResult;

/// Hex encoded SHA-256 of a file's contents
pub fn file_digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Feed a package's file tree into every digest context
///
/// Files are visited depth first in sorted directory order. For each file
/// the contexts receive `<path>\0<sha256-hex>\0`, with the path relative to
/// the package root. The whole record is gathered before any context is
/// touched, so a read error leaves the contexts as they were.
pub fn walk(package: &Package, contexts: &mut [Sha256]) -> ShelfResult<()> {
    if contexts.is_empty() {
        return Ok(());
    }

    let mut record = Vec::new();
    collect(package.root(), package.root(), &mut record)?;

    for context in contexts.iter_mut() {
        context.update(&record);
    }
    Ok(())
}

fn collect(root: &Node, dir: &Node, record: &mut Vec<u8>) -> ShelfResult<()> {
    for item in dir.directory_items()? {
        if item.is_dir() {
            collect(root, &item, record)?;
        } else if item.is_file() {
            let rel = item.relative_to(root)?;
            let sha = file_digest(&item.read_bytes()?);
            record.extend_from_slice(format!("{}\0{}\0", rel, sha).as_bytes());
        }
    }
    Ok(())
}

/// Running checksum over the packages of one load pass
///
/// Contexts are added with [`track`](ChecksumEngine::track); only packages
/// walked after that point contribute. The first context started is the
/// one reported by [`finish`](ChecksumEngine::finish).
#[derive(Debug, Clone, Default)]
pub struct ChecksumEngine {
    contexts: Vec<Sha256>,
}

impl ChecksumEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh digest context
    pub fn track(&mut self) {
        self.contexts.push(Sha256::new());
    }

    pub fn is_tracking(&self) -> bool {
        !self.contexts.is_empty()
    }

    pub fn walk(&mut self, package: &Package) -> ShelfResult<()> {
        walk(package, &mut self.contexts)
    }

    /// Hex digest of the first context, or `None` if none was started
    pub fn finish(self) -> Option<String> {
        self.contexts
            .into_iter()
            .next()
            .map(|context| hex::encode(context.finalize()))
    }
}
