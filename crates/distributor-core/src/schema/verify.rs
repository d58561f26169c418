//! Diffing an expected tree against an observed snapshot

use std::path::Path;

use distributor_fs::FileSystem;
use serde::Serialize;
use tracing::{debug, warn};

use super::node::{SchemaNode, SchemaPath};
use super::observed::ObservedNode;
use crate::Result;

/// Structured outcome of a verification pass.
///
/// `missing` holds leaf paths of the schema that the observed tree lacks;
/// an absent directory is reported through the leaves below it so that a
/// repair of exactly these paths converges. `unexpected` is informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub missing: Vec<SchemaPath>,
    pub unexpected: Vec<SchemaPath>,
}

impl DiffResult {
    /// True when nothing the schema requires is missing.
    pub fn is_converged(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compare `schema` with a snapshot. `None` stands for a missing root.
pub fn diff(schema: &SchemaNode, observed: Option<&ObservedNode>) -> DiffResult {
    let mut result = DiffResult::default();
    walk(schema, observed, &SchemaPath::root(), &mut result);
    result
}

fn walk(
    schema: &SchemaNode,
    observed: Option<&ObservedNode>,
    path: &SchemaPath,
    result: &mut DiffResult,
) {
    let Some(observed) = observed else {
        result.missing.extend(schema.leaf_paths(path));
        return;
    };

    for child in schema.children() {
        let child_path = path.join(child.name());
        match observed
            .child(child.name())
            .filter(|o| o.kind.satisfies(child))
        {
            Some(found) if !child.is_leaf() => walk(child, Some(found), &child_path, result),
            Some(_) => debug!(path = %child_path, "Present"),
            None => {
                debug!(path = %child_path, "Missing");
                result.missing.extend(child.leaf_paths(&child_path));
            }
        }
    }

    // Leaf nodes are never listed, so only compare where children are expected
    if schema.is_leaf() {
        return;
    }
    for entry in &observed.children {
        let known = schema
            .child(&entry.name)
            .is_some_and(|c| entry.kind.satisfies(c));
        if !known {
            let entry_path = path.join(&entry.name);
            warn!(path = %entry_path, kind = ?entry.kind, "Unexpected entry");
            result.unexpected.push(entry_path);
        }
    }
}

/// Read-only verifier for directory schemas.
pub struct TreeVerifier<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> TreeVerifier<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Take a fresh snapshot of `observed_root` and diff it against `schema`.
    ///
    /// A missing root is not an error: every leaf is reported missing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ScanFailure`] when a directory exists but
    /// cannot be listed.
    pub fn verify(&self, schema: &SchemaNode, observed_root: &Path) -> Result<DiffResult> {
        schema.validate()?;
        let observed = ObservedNode::scan_directory(self.fs, observed_root, schema)?;
        if observed.is_none() {
            debug!(root = %observed_root.display(), "Root does not exist");
        }
        Ok(diff(schema, observed.as_ref()))
    }
}
