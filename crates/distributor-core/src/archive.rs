//! Packing a category's mods into its archive folder
//!
//! The engine only needs to know whether archiving happened or was skipped.
//! [`ZipArchiver`] writes one versioned zip per change of the mod set and
//! tracks the archived checksums in an `archive.toml` manifest.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use distributor_fs::{EntryKind, FileSystem, checksum};
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::reconcile::{ModName, ModSet};
use crate::warehouse::ModCategory;
use crate::{Error, Result};

/// Name of the manifest written beside the zips.
pub const MANIFEST_FILE: &str = "archive.toml";

/// What an archive step did for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ArchiveOutcome {
    Archived {
        path: PathBuf,
        version: Version,
        files: usize,
    },
    /// The latest archive already holds exactly these mods
    Unchanged { version: Version },
    Skipped { reason: String },
}

/// Produces an archive of a category's mods.
pub trait Archiver {
    /// Archive `mods`, found in `source`, into the folder `destination`.
    fn archive(
        &self,
        fs: &dyn FileSystem,
        category: ModCategory,
        source: &Path,
        mods: &ModSet,
        destination: &Path,
    ) -> Result<ArchiveOutcome>;
}

/// Manifest describing the latest archive of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    pub version: Version,
    pub created_at: DateTime<Utc>,
    /// File name of the zip holding this version
    pub archive: String,
    /// Mod file name to `sha256:<hex>` checksum
    pub files: BTreeMap<String, String>,
}

impl ArchiveManifest {
    fn load(fs: &dyn FileSystem, path: &Path) -> Option<Self> {
        let bytes = match fs.read_file(path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read archive manifest");
                return None;
            }
        };
        let parsed = String::from_utf8(bytes)
            .map_err(|e| e.to_string())
            .and_then(|text| toml::from_str(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(manifest) => Some(manifest),
            Err(message) => {
                warn!(path = %path.display(), %message, "Ignoring damaged archive manifest");
                None
            }
        }
    }
}

/// Writes `<name>-<version>.zip` into the category's archive folder.
///
/// Versions start at `0.1.0`; the patch level is bumped whenever the set of
/// files or any checksum changes. Earlier zips are kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

fn zip_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn build_zip(entries: &[(&ModName, Vec<u8>)], comment: String) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer.start_file(name.as_str(), zip_options())?;
        writer.write_all(bytes)?;
    }
    writer.set_comment(comment);
    Ok(writer.finish()?.into_inner())
}

fn contains_file(fs: &dyn FileSystem, dir: &Path, name: &str) -> Result<bool> {
    let entries = fs
        .list_directory(dir)
        .map_err(|source| Error::ScanFailure {
            path: dir.to_path_buf(),
            source,
        })?
        .unwrap_or_default();
    Ok(entries
        .iter()
        .any(|e| e.kind == EntryKind::File && e.name == name))
}

impl Archiver for ZipArchiver {
    fn archive(
        &self,
        fs: &dyn FileSystem,
        category: ModCategory,
        source: &Path,
        mods: &ModSet,
        destination: &Path,
    ) -> Result<ArchiveOutcome> {
        if mods.is_empty() {
            let reason = format!("no mods in mods/{}", category);
            debug!(category = %category, "Nothing to archive");
            return Ok(ArchiveOutcome::Skipped { reason });
        }

        let mut entries = Vec::with_capacity(mods.len());
        let mut files = BTreeMap::new();
        for name in mods {
            let path = source.join(name.as_str());
            let bytes = fs.read_file(&path)?.ok_or_else(|| Error::Archive {
                path: destination.to_path_buf(),
                message: format!("{} disappeared while archiving", path.display()),
            })?;
            files.insert(name.to_string(), checksum::bytes_checksum(&bytes));
            entries.push((name, bytes));
        }

        let manifest_path = destination.join(MANIFEST_FILE);
        let previous = ArchiveManifest::load(fs, &manifest_path);
        if let Some(previous) = &previous
            && previous.files == files
            && contains_file(fs, destination, &previous.archive)?
        {
            debug!(category = %category, version = %previous.version, "Archive is up to date");
            return Ok(ArchiveOutcome::Unchanged {
                version: previous.version.clone(),
            });
        }

        let version = match previous {
            Some(previous) => Version::new(
                previous.version.major,
                previous.version.minor,
                previous.version.patch + 1,
            ),
            None => Version::new(0, 1, 0),
        };

        let archive_name = format!("{}-{}.zip", category.archive_name(), version);
        let zip_path = destination.join(&archive_name);
        let comment = format!("{} mods {}", category, version);
        let bytes = build_zip(&entries, comment).map_err(|e| Error::Archive {
            path: zip_path.clone(),
            message: e.to_string(),
        })?;
        fs.write_file(&zip_path, &bytes)?;

        let manifest = ArchiveManifest {
            version: version.clone(),
            created_at: Utc::now(),
            archive: archive_name,
            files,
        };
        fs.write_file(&manifest_path, toml::to_string_pretty(&manifest)?.as_bytes())?;

        info!(
            category = %category,
            version = %version,
            files = manifest.files.len(),
            path = %zip_path.display(),
            "Archived mods"
        );
        Ok(ArchiveOutcome::Archived {
            path: zip_path,
            version,
            files: manifest.files.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distributor_fs::LocalFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn setup(files: &[(&str, &str)]) -> (TempDir, PathBuf, PathBuf, ModSet) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("mods/server");
        let dest = temp.path().join("archives/essentials");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        let mut mods = ModSet::new();
        for (name, content) in files {
            fs::write(source.join(name), content).unwrap();
            mods.insert(ModName::from(*name));
        }
        (temp, source, dest, mods)
    }

    fn zip_entries(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn empty_source_is_skipped() {
        let (_temp, source, dest, mods) = setup(&[]);
        let outcome = ZipArchiver
            .archive(&LocalFileSystem::new(), ModCategory::Server, &source, &mods, &dest)
            .unwrap();
        assert!(
            matches!(outcome, ArchiveOutcome::Skipped { ref reason } if reason.contains("mods/server"))
        );
        assert!(!dest.join(MANIFEST_FILE).exists());
    }

    #[test]
    fn first_archive_is_a_zip_of_every_mod() {
        let (_temp, source, dest, mods) = setup(&[("a.jar", "a"), ("b.jar", "b")]);

        let outcome = ZipArchiver
            .archive(&LocalFileSystem::new(), ModCategory::Server, &source, &mods, &dest)
            .unwrap();

        let zip_path = dest.join("essentials-0.1.0.zip");
        assert_eq!(
            outcome,
            ArchiveOutcome::Archived {
                path: zip_path.clone(),
                version: Version::new(0, 1, 0),
                files: 2,
            }
        );
        assert_eq!(zip_entries(&zip_path), vec!["a.jar", "b.jar"]);
    }

    #[test]
    fn rearchiving_same_mods_keeps_version() {
        let (_temp, source, dest, mods) = setup(&[("a.jar", "a"), ("b.jar", "b")]);
        let fs_provider = LocalFileSystem::new();

        ZipArchiver
            .archive(&fs_provider, ModCategory::Server, &source, &mods, &dest)
            .unwrap();
        let second = ZipArchiver
            .archive(&fs_provider, ModCategory::Server, &source, &mods, &dest)
            .unwrap();

        assert_eq!(
            second,
            ArchiveOutcome::Unchanged {
                version: Version::new(0, 1, 0)
            }
        );
    }

    #[test]
    fn changed_mods_bump_patch_and_keep_history() {
        let (_temp, source, dest, mods) = setup(&[("a.jar", "a"), ("b.jar", "b")]);
        let fs_provider = LocalFileSystem::new();
        ZipArchiver
            .archive(&fs_provider, ModCategory::Server, &source, &mods, &dest)
            .unwrap();

        fs::remove_file(source.join("b.jar")).unwrap();
        let mods: ModSet = [ModName::from("a.jar")].into_iter().collect();
        let outcome = ZipArchiver
            .archive(&fs_provider, ModCategory::Server, &source, &mods, &dest)
            .unwrap();

        assert!(
            matches!(outcome, ArchiveOutcome::Archived { ref version, .. } if *version == Version::new(0, 1, 1))
        );
        assert_eq!(zip_entries(&dest.join("essentials-0.1.1.zip")), vec!["a.jar"]);
        assert_eq!(zip_entries(&dest.join("essentials-0.1.0.zip")), vec!["a.jar", "b.jar"]);
    }

    #[test]
    fn missing_zip_is_rebuilt_under_a_new_version() {
        let (_temp, source, dest, mods) = setup(&[("a.jar", "a")]);
        let fs_provider = LocalFileSystem::new();
        ZipArchiver
            .archive(&fs_provider, ModCategory::Server, &source, &mods, &dest)
            .unwrap();
        fs::remove_file(dest.join("essentials-0.1.0.zip")).unwrap();

        let outcome = ZipArchiver
            .archive(&fs_provider, ModCategory::Server, &source, &mods, &dest)
            .unwrap();

        assert!(matches!(outcome, ArchiveOutcome::Archived { .. }));
        assert!(dest.join("essentials-0.1.1.zip").is_file());
    }
}
