use super::TreeNode;
use shelf_core::core::{ShelfError, ShelfResult};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use zip::ZipArchive;

/// Entry names of one zip file, indexed once at open time
struct ArchiveIndex {
    source: PathBuf,
    files: BTreeSet<String>,
    // Includes directories only implied by member paths, and "" for the root
    dirs: BTreeSet<String>,
    zip: Mutex<ZipArchive<File>>,
}

impl fmt::Debug for ArchiveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveIndex")
            .field("source", &self.source)
            .field("files", &self.files.len())
            .field("dirs", &self.dirs.len())
            .finish()
    }
}

/// A file or directory inside a zip archive
///
/// Zip files have no real directories, only member names. Directory
/// structure is derived from those names, so archives built without
/// explicit directory entries still walk like a normal tree.
#[derive(Debug, Clone)]
pub struct ArchiveNode {
    index: Arc<ArchiveIndex>,
    path: String,
    name: String,
}

impl ArchiveNode {
    /// Open a zip file and return its root node
    pub fn open(source: &Path) -> ShelfResult<Self> {
        let file = File::open(source)?;
        let zip = ZipArchive::new(file).map_err(|e| {
            ShelfError::Archive(format!("Invalid zip {}: {}", source.display(), e))
        })?;

        let mut files = BTreeSet::new();
        let mut dirs = BTreeSet::new();
        dirs.insert(String::new());

        for member in zip.file_names() {
            let (entry, is_dir) = match member.strip_suffix('/') {
                Some(dir) => (dir, true),
                None => (member, false),
            };
            let entry = entry.trim_start_matches('/');
            if entry.is_empty() {
                continue;
            }

            let mut parent = parent_of(entry);
            while !parent.is_empty() {
                dirs.insert(parent.to_string());
                parent = parent_of(parent);
            }

            if is_dir {
                dirs.insert(entry.to_string());
            } else {
                files.insert(entry.to_string());
            }
        }

        let index = ArchiveIndex {
            source: source.to_path_buf(),
            files,
            dirs,
            zip: Mutex::new(zip),
        };

        Ok(Self {
            index: Arc::new(index),
            path: String::new(),
            name: String::new(),
        })
    }

    fn at(&self, path: String) -> Self {
        let name = match path.rsplit_once('/') {
            Some((_, name)) => name.to_string(),
            None => path.clone(),
        };
        Self {
            index: Arc::clone(&self.index),
            path,
            name,
        }
    }
}

fn parent_of(entry: &str) -> &str {
    match entry.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

impl TreeNode for ArchiveNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn iter_children(&self) -> ShelfResult<Vec<Self>> {
        if !self.is_dir() {
            return Err(ShelfError::NotFound(format!(
                "{} is not a directory",
                self.display()
            )));
        }

        Ok(self
            .index
            .dirs
            .iter()
            .chain(self.index.files.iter())
            .filter(|entry| !entry.is_empty() && parent_of(entry) == self.path)
            .map(|entry| self.at(entry.clone()))
            .collect())
    }

    fn is_dir(&self) -> bool {
        self.index.dirs.contains(&self.path)
    }

    fn is_file(&self) -> bool {
        self.index.files.contains(&self.path)
    }

    fn read_bytes(&self) -> ShelfResult<Vec<u8>> {
        if !self.is_file() {
            return Err(ShelfError::NotFound(self.display()));
        }

        let mut zip = self
            .index
            .zip
            .lock()
            .map_err(|_| ShelfError::Archive("Archive lock poisoned".to_string()))?;
        let mut member = zip
            .by_name(&self.path)
            .map_err(|e| ShelfError::Archive(format!("{}: {}", self.display(), e)))?;

        let mut data = Vec::new();
        member.read_to_end(&mut data)?;
        Ok(data)
    }

    fn join(&self, name: &str) -> Self {
        if self.path.is_empty() {
            self.at(name.to_string())
        } else {
            self.at(format!("{}/{}", self.path, name))
        }
    }

    fn relative_to(&self, ancestor: &Self) -> ShelfResult<String> {
        if !Arc::ptr_eq(&self.index, &ancestor.index) {
            return Err(ShelfError::Path(format!(
                "{} and {} are in different archives",
                self.display(),
                ancestor.display()
            )));
        }

        if ancestor.path.is_empty() {
            return Ok(self.path.clone());
        }

        self.path
            .strip_prefix(&ancestor.path)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
            .ok_or_else(|| {
                ShelfError::Path(format!(
                    "{} is not below {}",
                    self.display(),
                    ancestor.display()
                ))
            })
    }

    fn display(&self) -> String {
        format!("{}/{}", self.index.source.display(), self.path)
    }
}
