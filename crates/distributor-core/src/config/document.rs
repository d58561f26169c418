//! Verification and repair of `distribution-config.toml`
//!
//! The file is checked against a [`SchemaNode`] of config keys using the same
//! verifier as the warehouse folders. Repairs go through `toml_edit` so that
//! values and comments the operator wrote survive; only missing keys are
//! added, with empty values.

use std::path::{Path, PathBuf};

use distributor_fs::{CreateOutcome, FileSystem};
use serde::Serialize;
use toml_edit::{DocumentMut, TableLike};
use tracing::{debug, info, warn};

use crate::schema::{
    self, DiffResult, ObservedNode, RepairResult, RepairTarget, SchemaNode, SchemaPath,
};
use crate::{Error, Result};

/// How the configuration file ended up after a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfigStatus {
    /// All required keys were present
    Valid,
    /// Missing keys were added to an otherwise valid file
    Repaired,
    /// The file did not exist and was written from defaults
    Created,
    /// The file could not be used and was replaced by defaults
    Regenerated { reason: String },
}

/// Outcome of verifying and repairing the configuration file.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub path: PathBuf,
    pub status: ConfigStatus,
    pub diff: DiffResult,
    pub repair: RepairResult,
}

impl ConfigReport {
    /// True when the file on disk was changed by this pass.
    pub fn was_written(&self) -> bool {
        self.status != ConfigStatus::Valid
    }
}

enum Loaded {
    Missing,
    Parsed(DocumentMut),
    Unparsable(String),
}

fn load<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<Loaded> {
    let Some(bytes) = fs.read_file(path)? else {
        return Ok(Loaded::Missing);
    };
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => return Ok(Loaded::Unparsable(format!("not valid UTF-8: {}", e))),
    };
    match text.parse::<DocumentMut>() {
        Ok(doc) => Ok(Loaded::Parsed(doc)),
        Err(e) => Ok(Loaded::Unparsable(e.to_string())),
    }
}

/// [`RepairTarget`] inserting missing keys into a TOML document.
///
/// Parent segments become tables, leaves become empty strings.
struct DocumentTarget<'a> {
    doc: &'a mut DocumentMut,
    path: &'a Path,
}

impl RepairTarget for DocumentTarget<'_> {
    fn create(&mut self, key: &SchemaPath) -> Result<CreateOutcome> {
        insert_key(self.doc.as_table_mut(), key.segments()).map_err(|message| {
            Error::ParseFailure {
                path: self.path.to_path_buf(),
                message: format!("'{}' {}", key.dotted(), message),
            }
        })
    }
}

fn insert_key(
    table: &mut dyn TableLike,
    segments: &[String],
) -> std::result::Result<CreateOutcome, String> {
    let Some((first, rest)) = segments.split_first() else {
        return Err("cannot replace the document root".to_string());
    };

    if rest.is_empty() {
        if table.contains_key(first) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        table.insert(first, toml_edit::value(""));
        return Ok(CreateOutcome::Created);
    }

    if !table.contains_key(first) {
        table.insert(first, toml_edit::Item::Table(toml_edit::Table::new()));
    }
    let child = table
        .get_mut(first)
        .and_then(|item| item.as_table_like_mut())
        .ok_or_else(|| format!("expects '{}' to be a table", first))?;
    insert_key(child, rest)
}

fn observe(schema: &SchemaNode, doc: &DocumentMut) -> DiffResult {
    let observed = ObservedNode::from_toml(schema.name(), doc.as_table());
    schema::diff(schema, Some(&observed))
}

fn fill_defaults(
    schema: &SchemaNode,
    doc: &mut DocumentMut,
    path: &Path,
) -> Result<(DiffResult, RepairResult)> {
    let diff = observe(schema, doc);
    let repair = schema::repair_into(&diff, &mut DocumentTarget { doc, path })?;
    Ok((diff, repair))
}

/// Serialize the defaults of `schema`: every key present, every value empty.
pub fn default_document(schema: &SchemaNode) -> Result<String> {
    schema.validate()?;
    let mut doc = DocumentMut::new();
    fill_defaults(schema, &mut doc, Path::new(schema.name()))?;
    Ok(doc.to_string())
}

/// Verify the configuration file at `path` against `schema` and repair it.
///
/// A missing file is created from defaults. A file that does not parse, or
/// whose shape contradicts the schema (a value where a table is required),
/// is treated as fully missing and regenerated. Existing keys are never
/// modified.
///
/// # Errors
///
/// Returns [`Error::RepairFailure`] when the repaired file cannot be
/// written and [`Error::InvalidSchema`] for a malformed schema.
pub fn verify_and_repair<F: FileSystem + ?Sized>(
    fs: &F,
    path: &Path,
    schema: &SchemaNode,
) -> Result<ConfigReport> {
    schema.validate()?;

    let (mut doc, mut status) = match load(fs, path)? {
        Loaded::Missing => {
            info!(path = %path.display(), "Configuration not found, creating it");
            (DocumentMut::new(), ConfigStatus::Created)
        }
        Loaded::Parsed(doc) => (doc, ConfigStatus::Valid),
        Loaded::Unparsable(reason) => {
            warn!(path = %path.display(), %reason, "Configuration is damaged, regenerating");
            (DocumentMut::new(), ConfigStatus::Regenerated { reason })
        }
    };

    let (diff, repair) = match fill_defaults(schema, &mut doc, path) {
        Ok(outcome) => outcome,
        Err(Error::ParseFailure { message, .. }) => {
            warn!(
                path = %path.display(),
                reason = %message,
                "Configuration has the wrong shape, regenerating"
            );
            doc = DocumentMut::new();
            status = ConfigStatus::Regenerated { reason: message };
            fill_defaults(schema, &mut doc, path)?
        }
        Err(e) => return Err(e),
    };

    if status == ConfigStatus::Valid && !repair.is_noop() {
        status = ConfigStatus::Repaired;
    }

    if status == ConfigStatus::Valid {
        debug!(path = %path.display(), "Configuration is valid");
    } else {
        fs.write_file(path, doc.to_string().as_bytes())
            .map_err(|source| Error::RepairFailure {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), status = ?status, "Wrote configuration");
    }

    Ok(ConfigReport {
        path: path.to_path_buf(),
        status,
        diff,
        repair,
    })
}
