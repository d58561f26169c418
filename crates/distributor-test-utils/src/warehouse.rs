//! [`TestWarehouse`] builder for distributor test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The four leaf folders of a complete warehouse.
pub const WAREHOUSE_FOLDERS: [&str; 4] = [
    "mod_warehouse/mods/server",
    "mod_warehouse/mods/client",
    "mod_warehouse/archives/essentials",
    "mod_warehouse/archives/client",
];

/// A temporary project directory with helpers for setup and assertions.
///
/// # Example
///
/// ```rust,no_run
/// use distributor_test_utils::warehouse::TestWarehouse;
///
/// let project = TestWarehouse::new();
/// project.init_layout();
/// project.add_mod("server", "a.jar");
/// project.assert_file_exists("mod_warehouse/mods/server/a.jar");
/// ```
pub struct TestWarehouse {
    temp_dir: TempDir,
}

impl Default for TestWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWarehouse {
    /// Create an empty temporary project directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Create every warehouse folder.
    pub fn init_layout(&self) {
        for folder in WAREHOUSE_FOLDERS {
            fs::create_dir_all(self.path(folder)).unwrap();
        }
    }

    /// Create only some folders, relative to the project root.
    pub fn init_folders(&self, folders: &[&str]) {
        for folder in folders {
            fs::create_dir_all(self.path(folder)).unwrap();
        }
    }

    /// Add a mod file to `mod_warehouse/mods/<category>/`.
    ///
    /// The file content is derived from its name so checksums differ per mod.
    pub fn add_mod(&self, category: &str, name: &str) -> PathBuf {
        let dir = self.path(&format!("mod_warehouse/mods/{}", category));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, format!("jar:{}", name)).unwrap();
        path
    }

    /// Write `distribution-config.toml` verbatim.
    pub fn write_config(&self, content: &str) {
        fs::write(self.path("distribution-config.toml"), content).unwrap();
    }

    /// Write a complete `[FTP]` config pointing `mount` at `mount`.
    pub fn write_mounted_config(&self, mount: &Path) {
        self.write_config(&format!(
            "[FTP]\nhost = \"mc.example.org\"\nuser = \"ops\"\npassword = \"secret\"\nport = 22\nmount = '{}'\n",
            mount.display()
        ));
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.path("distribution-config.toml")).unwrap()
    }

    pub fn assert_dir_exists(&self, relative: &str) {
        assert!(
            self.path(relative).is_dir(),
            "Expected directory {} to exist",
            relative
        );
    }

    pub fn assert_file_exists(&self, relative: &str) {
        assert!(
            self.path(relative).is_file(),
            "Expected file {} to exist",
            relative
        );
    }

    pub fn assert_not_exists(&self, relative: &str) {
        assert!(
            !self.path(relative).exists(),
            "Expected {} to not exist",
            relative
        );
    }
}
