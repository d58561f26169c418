//! Local versus remote mod set reconciliation

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// File name of a single mod artifact. Compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModName(String);

impl ModName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ModName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A set of mods, ordered by name so plans are applied deterministically.
pub type ModSet = BTreeSet<ModName>;

/// Corrective actions converging a remote mod set to a local one.
///
/// `to_upload` and `to_delete` are always disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    pub to_upload: ModSet,
    pub to_delete: ModSet,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_upload.is_empty() && self.to_delete.is_empty()
    }

    /// The remote set after the plan has been applied in full.
    pub fn apply_to(&self, remote: &ModSet) -> ModSet {
        remote
            .difference(&self.to_delete)
            .chain(self.to_upload.iter())
            .cloned()
            .collect()
    }
}

/// Compute the plan turning `remote` into `local`.
///
/// Pure: the result depends only on the two sets, never on iteration order.
pub fn reconcile(local: &ModSet, remote: &ModSet) -> ReconciliationPlan {
    ReconciliationPlan {
        to_upload: local.difference(remote).cloned().collect(),
        to_delete: remote.difference(local).cloned().collect(),
    }
}
