use crate::package::OverrideSources;
use serde::{Deserialize, Serialize};
use shelf_core::core::path::{
    config_file, system_data_dirs, user_config_home, user_data_home,
};
use shelf_core::core::{ShelfError, ShelfResult};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Subdirectory holding packages inside every data directory, and the
    /// name of the override directories
    #[serde(default = "default_package_dir_name")]
    pub package_dir_name: String,

    /// Runtime name manifests may list under `requires`
    #[serde(default = "default_runtime_name")]
    pub runtime_name: String,

    /// User data directory (defaults to `$XDG_DATA_HOME` or `~/.local/share`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_dir: Option<String>,

    /// System data directories, searched in order
    /// (defaults to `$XDG_DATA_DIRS` or `/usr/local/share:/usr/share`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data_dirs: Option<Vec<String>>,

    /// System-wide override directory (defaults to `/etc/<package_dir_name>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_config_dir: Option<String>,

    /// Per-user override directory
    /// (defaults to `$XDG_CONFIG_HOME/<package_dir_name>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_config_dir: Option<String>,

    /// Zip archive whose `dist/` directory is searched after the user
    /// directory and before the system directories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_archive: Option<String>,
}

fn default_package_dir_name() -> String {
    "shelf".to_string()
}

fn default_runtime_name() -> String {
    "shelf".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package_dir_name: default_package_dir_name(),
            runtime_name: default_runtime_name(),
            user_data_dir: None,
            system_data_dirs: None,
            system_config_dir: None,
            user_config_dir: None,
            bundle_archive: None,
        }
    }
}

impl Config {
    /// Load config from the platform-specific config directory
    ///
    /// A missing file means all defaults.
    ///
    /// Config locations:
    /// - Linux: ~/.config/shelf/config.yaml
    /// - macOS: ~/Library/Application Support/shelf/config.yaml
    /// - Windows: %APPDATA%\shelf\config.yaml
    pub fn load() -> ShelfResult<Self> {
        let config_path = config_file()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> ShelfResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ShelfError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_yaml::from_str(&content)?;

        if config.package_dir_name.is_empty() || config.package_dir_name.contains('/') {
            return Err(ShelfError::Config(format!(
                "Invalid package_dir_name: '{}'",
                config.package_dir_name
            )));
        }

        Ok(config)
    }

    /// Directory holding the user's own packages
    pub fn user_packages_dir(&self) -> ShelfResult<PathBuf> {
        let base = match &self.user_data_dir {
            Some(dir) => PathBuf::from(dir),
            None => user_data_home()?,
        };
        Ok(base.join(&self.package_dir_name))
    }

    /// System package directories, highest precedence first
    pub fn system_packages_dirs(&self) -> Vec<PathBuf> {
        let bases = match &self.system_data_dirs {
            Some(dirs) => dirs
                .iter()
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .collect(),
            None => system_data_dirs(),
        };
        bases
            .into_iter()
            .map(|base| base.join(&self.package_dir_name))
            .collect()
    }

    pub fn override_sources(&self) -> ShelfResult<OverrideSources> {
        let system_dir = match &self.system_config_dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from("/etc").join(&self.package_dir_name),
        };
        let user_dir = match &self.user_config_dir {
            Some(dir) => PathBuf::from(dir),
            None => user_config_home()?.join(&self.package_dir_name),
        };
        Ok(OverrideSources {
            system_dir,
            user_dir,
        })
    }

    pub fn bundle_archive(&self) -> Option<PathBuf> {
        self.bundle_archive.as_ref().map(PathBuf::from)
    }
}
