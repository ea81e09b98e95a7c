use super::{name_matcher, TreeNode};
use shelf_core::core::{ShelfError, ShelfResult};
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// A file or directory on the real filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsNode {
    path: PathBuf,
    name: String,
}

impl FsNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

impl TreeNode for FsNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn iter_children(&self) -> ShelfResult<Vec<Self>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            children.push(FsNode::new(entry?.path()));
        }
        Ok(children)
    }

    fn is_dir(&self) -> bool {
        self.path.is_dir()
    }

    fn is_file(&self) -> bool {
        self.path.is_file()
    }

    fn read_bytes(&self) -> ShelfResult<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    fn join(&self, name: &str) -> Self {
        FsNode::new(self.path.join(name))
    }

    fn relative_to(&self, ancestor: &Self) -> ShelfResult<String> {
        let relative = self.path.strip_prefix(&ancestor.path).map_err(|_| {
            ShelfError::Path(format!(
                "{} is not below {}",
                self.path.display(),
                ancestor.path.display()
            ))
        })?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    // walkdir sorts each directory by file name, which is the same order
    // the default depth-first emulation produces.
    fn glob(&self, pattern: &str) -> ShelfResult<Vec<Self>> {
        let matcher = name_matcher(pattern)?;
        let mut found = Vec::new();

        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if matcher.is_match(entry.file_name().to_string_lossy().as_ref()) {
                found.push(FsNode::new(entry.path()));
            }
        }

        Ok(found)
    }
}
