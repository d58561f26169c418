//! Filesystem provider used by the verification and repair passes
//!
//! The engine only talks to the disk through [`FileSystem`], which keeps
//! the scan and repair logic testable against fakes.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::{Error, Result, io};

/// Kind of an entry found while listing a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    Directory,
    File,
}

/// A single entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Result of asking for a directory to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The directory was created by this call
    Created,
    /// The directory was already there, possibly created concurrently
    AlreadyExists,
}

/// Filesystem operations consumed by the engine.
pub trait FileSystem {
    /// List a directory, sorted by name.
    ///
    /// Returns `Ok(None)` when the directory does not exist. Symlinks are
    /// followed and dangling ones are left out. Any other failure
    /// (permissions, a file in the way) is an error.
    fn list_directory(&self, path: &Path) -> Result<Option<Vec<DirEntry>>>;

    /// Ensure a directory exists, creating parent segments as needed.
    fn create_directory(&self, path: &Path) -> Result<CreateOutcome>;

    /// Read a file, `Ok(None)` when it does not exist.
    fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Replace a file's content.
    fn write_file(&self, path: &Path, content: &[u8]) -> Result<()>;
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn list_directory(&self, path: &Path) -> Result<Option<Vec<DirEntry>>> {
        match fs::metadata(path) {
            Ok(meta) if !meta.is_dir() => {
                return Err(Error::NotADirectory {
                    path: path.to_path_buf(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(path = %path.display(), "Directory does not exist");
                return Ok(None);
            }
            Err(e) => return Err(Error::io(path, e)),
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| Error::io(path, e))? {
            let entry = entry.map_err(|e| Error::io(path, e))?;
            // Follow symlinks so a linked folder still counts as a directory
            let kind = match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => EntryKind::Directory,
                Ok(_) => EntryKind::File,
                Err(e) if e.kind() == ErrorKind::NotFound && is_symlink(&entry.path()) => {
                    warn!(path = %entry.path().display(), "Skipping dangling symlink");
                    continue;
                }
                Err(e) => return Err(Error::io(entry.path(), e)),
            };
            entries.push(DirEntry::new(
                entry.file_name().to_string_lossy().into_owned(),
                kind,
            ));
        }
        entries.sort();

        debug!(path = %path.display(), count = entries.len(), "Listed directory");
        Ok(Some(entries))
    }

    fn create_directory(&self, path: &Path) -> Result<CreateOutcome> {
        if path.is_dir() {
            return Ok(CreateOutcome::AlreadyExists);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        match fs::create_dir(path) {
            Ok(()) => Ok(CreateOutcome::Created),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if path.is_dir() {
                    Ok(CreateOutcome::AlreadyExists)
                } else {
                    Err(Error::NotADirectory {
                        path: path.to_path_buf(),
                    })
                }
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        io::read_optional(path)
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        io::write_atomic(path, content)
    }
}
