//! Project layout and the local mod categories

use std::fmt;
use std::path::{Path, PathBuf};

use distributor_fs::{EntryKind, FileSystem, WarehousePath};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::reconcile::{ModName, ModSet};
use crate::{Error, Result};

/// Group of mods kept in its own warehouse folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModCategory {
    Server,
    Client,
}

impl ModCategory {
    pub const ALL: [ModCategory; 2] = [ModCategory::Server, ModCategory::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Client => "client",
        }
    }

    /// Folder under `archives/` holding this category's archive.
    pub fn archive_name(&self) -> &'static str {
        match self {
            Self::Server => "essentials",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for ModCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths of a distributor project rooted at `root`.
#[derive(Debug, Clone)]
pub struct Warehouse {
    root: PathBuf,
}

impl Warehouse {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(WarehousePath::ConfigFile)
    }

    pub fn warehouse_path(&self) -> PathBuf {
        self.root.join(WarehousePath::Warehouse)
    }

    pub fn mods_path(&self, category: ModCategory) -> PathBuf {
        self.root.join(WarehousePath::Mods).join(category.as_str())
    }

    pub fn archive_path(&self, category: ModCategory) -> PathBuf {
        self.root
            .join(WarehousePath::Archives)
            .join(category.archive_name())
    }

    /// Names of the mod files currently in a category folder.
    ///
    /// Sub-folders are not mods and are skipped. A missing folder is an
    /// empty category.
    pub fn local_mods<F: FileSystem + ?Sized>(
        &self,
        fs: &F,
        category: ModCategory,
    ) -> Result<ModSet> {
        let path = self.mods_path(category);
        let entries = fs
            .list_directory(&path)
            .map_err(|source| Error::ScanFailure {
                path: path.clone(),
                source,
            })?
            .unwrap_or_default();

        let mut mods = ModSet::new();
        for entry in entries {
            match entry.kind {
                EntryKind::File => {
                    mods.insert(ModName::new(entry.name));
                }
                EntryKind::Directory => {
                    warn!(
                        category = %category,
                        name = %entry.name,
                        "Skipping folder inside mods directory"
                    );
                }
            }
        }
        debug!(category = %category, count = mods.len(), "Loaded local mods");
        Ok(mods)
    }
}
