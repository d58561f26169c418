//! Creating exactly what a verification pass found missing

use std::path::{Path, PathBuf};

use distributor_fs::{CreateOutcome, FileSystem};
use serde::Serialize;
use tracing::{debug, info};

use super::node::SchemaPath;
use super::verify::DiffResult;
use crate::{Error, Result};

/// Something a missing schema path can be created in.
pub trait RepairTarget {
    /// Create `path` along with any missing parents.
    ///
    /// An entry that already exists is reported as
    /// [`CreateOutcome::AlreadyExists`], never as an error.
    fn create(&mut self, path: &SchemaPath) -> Result<CreateOutcome>;
}

/// What a repair pass actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairResult {
    pub created: Vec<SchemaPath>,
    pub already_present: Vec<SchemaPath>,
}

impl RepairResult {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

/// Apply `diff.missing` to `target`. Unexpected entries are left alone.
pub fn repair_into<T: RepairTarget + ?Sized>(
    diff: &DiffResult,
    target: &mut T,
) -> Result<RepairResult> {
    let mut result = RepairResult::default();
    for path in &diff.missing {
        match target.create(path)? {
            CreateOutcome::Created => {
                info!(path = %path, "Created missing entry");
                result.created.push(path.clone());
            }
            CreateOutcome::AlreadyExists => {
                debug!(path = %path, "Already present");
                result.already_present.push(path.clone());
            }
        }
    }
    Ok(result)
}

/// [`RepairTarget`] creating directories below a root on a [`FileSystem`].
pub struct DirectoryTarget<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    root: PathBuf,
}

impl<'a, F: FileSystem + ?Sized> DirectoryTarget<'a, F> {
    pub fn new(fs: &'a F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }
}

impl<F: FileSystem + ?Sized> RepairTarget for DirectoryTarget<'_, F> {
    fn create(&mut self, path: &SchemaPath) -> Result<CreateOutcome> {
        let native = self.root.join(path.to_relative_path());
        self.fs
            .create_directory(&native)
            .map_err(|source| Error::RepairFailure {
                path: native,
                source,
            })
    }
}

/// Directory repairer for schemas verified with [`super::TreeVerifier`].
pub struct TreeRepairer<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> TreeRepairer<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Create every missing path of `diff` under `target_root`.
    ///
    /// Safe to call repeatedly or concurrently with another process doing
    /// the same: paths that appeared in the meantime count as present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RepairFailure`] naming the path that could not be
    /// created.
    pub fn repair(&self, diff: &DiffResult, target_root: &Path) -> Result<RepairResult> {
        repair_into(diff, &mut DirectoryTarget::new(self.fs, target_root))
    }
}
