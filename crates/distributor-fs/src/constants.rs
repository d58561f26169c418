//! Well-known paths of a distributor project.

use std::path::Path;

/// Fixed locations inside a distributor project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehousePath {
    /// `distribution-config.toml`
    ConfigFile,
    /// `mod_warehouse`
    Warehouse,
    /// `mod_warehouse/mods`
    Mods,
    /// `mod_warehouse/archives`
    Archives,
}

impl WarehousePath {
    /// Get the string representation of the path, relative to the project root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigFile => "distribution-config.toml",
            Self::Warehouse => "mod_warehouse",
            Self::Mods => "mod_warehouse/mods",
            Self::Archives => "mod_warehouse/archives",
        }
    }
}

impl AsRef<Path> for WarehousePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for WarehousePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for WarehousePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
