//! Point-in-time snapshots of the live state a schema is checked against

use std::path::Path;

use distributor_fs::{EntryKind, FileSystem};
use tracing::trace;

use super::node::{NodeKind, SchemaNode};
use crate::{Error, Result};

/// Kind of an entry found in the live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservedKind {
    Directory,
    File,
    /// A TOML table (or inline table)
    Table,
    /// Any other TOML value
    Value,
}

impl ObservedKind {
    /// Whether an entry of this kind satisfies `schema`.
    ///
    /// Config keys with children need a table; a leaf key is satisfied by
    /// any value, so a hand-written table in its place still counts as set.
    pub fn satisfies(self, schema: &SchemaNode) -> bool {
        match schema.kind() {
            NodeKind::Directory => self == ObservedKind::Directory,
            NodeKind::ConfigKey if schema.is_leaf() => {
                matches!(self, ObservedKind::Value | ObservedKind::Table)
            }
            NodeKind::ConfigKey => self == ObservedKind::Table,
        }
    }
}

/// Snapshot of one observed entry.
///
/// Children are only populated where the schema asked to look inside, so
/// a leaf directory full of mods is recorded without its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedNode {
    pub name: String,
    pub kind: ObservedKind,
    pub children: Vec<ObservedNode>,
}

impl ObservedNode {
    pub fn new(name: impl Into<String>, kind: ObservedKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: ObservedNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn child(&self, name: &str) -> Option<&ObservedNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Scan the directory at `root` guided by `schema`.
    ///
    /// Returns `Ok(None)` when `root` does not exist. Below the root, a
    /// directory is only listed when the schema expects children inside it.
    pub fn scan_directory<F: FileSystem + ?Sized>(
        fs: &F,
        root: &Path,
        schema: &SchemaNode,
    ) -> Result<Option<ObservedNode>> {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut node = ObservedNode::new(name, ObservedKind::Directory);

        let entries = match fs.list_directory(root) {
            Ok(Some(entries)) => entries,
            Ok(None) => return Ok(None),
            Err(source) => {
                return Err(Error::ScanFailure {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };
        if schema.is_leaf() {
            return Ok(Some(node));
        }

        for entry in entries {
            let expected = schema
                .child(&entry.name)
                .filter(|child| child.kind() == NodeKind::Directory);
            let child = match (entry.kind, expected) {
                (EntryKind::Directory, Some(child_schema)) if !child_schema.is_leaf() => {
                    Self::scan_directory(fs, &root.join(&entry.name), child_schema)?
                        .unwrap_or_else(|| ObservedNode::new(&entry.name, ObservedKind::Directory))
                }
                (EntryKind::Directory, _) => ObservedNode::new(&entry.name, ObservedKind::Directory),
                (EntryKind::File, _) => ObservedNode::new(&entry.name, ObservedKind::File),
            };
            trace!(path = %root.join(&child.name).display(), kind = ?child.kind, "Observed entry");
            node.children.push(child);
        }

        Ok(Some(node))
    }

    /// Snapshot a parsed TOML document.
    pub fn from_toml(name: impl Into<String>, table: &toml_edit::Table) -> ObservedNode {
        let mut node = ObservedNode::new(name, ObservedKind::Table);
        for (key, item) in table.iter() {
            node.children.push(Self::from_item(key, item));
        }
        node
    }

    fn from_item(key: &str, item: &toml_edit::Item) -> ObservedNode {
        match item {
            toml_edit::Item::Table(table) => Self::from_toml(key, table),
            toml_edit::Item::Value(toml_edit::Value::InlineTable(inline)) => {
                let mut node = ObservedNode::new(key, ObservedKind::Table);
                for (inner_key, value) in inline.iter() {
                    node.children.push(Self::from_item(
                        inner_key,
                        &toml_edit::Item::Value(value.clone()),
                    ));
                }
                node
            }
            _ => ObservedNode::new(key, ObservedKind::Value),
        }
    }
}
