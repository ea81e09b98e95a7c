use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use std::path::{Path, PathBuf};

pub mod cat;
pub mod list;
pub mod manifests;

/// Test context that provides an isolated set of package roots for each test
pub struct TestContext {
    pub temp: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let ctx = Self { temp };
        ctx.temp
            .child("shelf.yaml")
            .write_str(&ctx.config_yaml())
            .unwrap();
        ctx
    }

    fn config_yaml(&self) -> String {
        let base = self.temp.path().display();
        format!(
            "user_data_dir: {base}/home\n\
             system_data_dirs:\n  - {base}/sys\n\
             system_config_dir: {base}/etc\n\
             user_config_dir: {base}/config\n"
        )
    }

    /// Create a Command for running shelf against this context
    pub fn shelf(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("shelf").unwrap();
        cmd.current_dir(&self.temp);
        cmd.arg("--config").arg(self.temp.child("shelf.yaml").path());
        cmd.env("XDG_CONFIG_HOME", self.temp.child("config").path());
        cmd.env("HOME", self.temp.path());
        cmd
    }

    pub fn user_packages(&self) -> PathBuf {
        self.temp.child("home/shelf").to_path_buf()
    }

    pub fn system_packages(&self) -> PathBuf {
        self.temp.child("sys/shelf").to_path_buf()
    }

    /// Write a package directory with a manifest and extra files
    pub fn create_package(&self, root: &Path, dir: &str, manifest: &str, files: &[(&str, &str)]) {
        let package = root.join(dir);
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("manifest.json"), manifest).unwrap();
        for (name, content) in files {
            let path = package.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }
}
