//! Declarative description of an expected tree

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// What a schema entry stands for on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A filesystem directory
    Directory,
    /// A key (or table of keys) in a structured config file
    ConfigKey,
}

/// Path of a node relative to the schema root, e.g. `mods/server` or `FTP/host`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaPath(Vec<String>);

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Append a segment, returning the child path.
    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Native relative path for filesystem targets.
    pub fn to_relative_path(&self) -> PathBuf {
        self.0.iter().collect()
    }

    /// Dotted form used when naming config keys to an operator (`FTP.host`).
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl From<&str> for SchemaPath {
    fn from(s: &str) -> Self {
        Self(
            s.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// One expected entry and its expected children.
///
/// Trees are authored once per target (warehouse, config file) and never
/// mutated afterwards. Sibling names must be unique; [`SchemaNode::validate`]
/// checks this before a tree is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    name: String,
    kind: NodeKind,
    #[serde(default)]
    children: Vec<SchemaNode>,
}

impl SchemaNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Directory)
    }

    pub fn key(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::ConfigKey)
    }

    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SchemaNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Look up a descendant by its path relative to this node.
    pub fn find(&self, path: &SchemaPath) -> Option<&SchemaNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Paths of every leaf below this node, in authoring order.
    ///
    /// A node without children is its own leaf.
    pub fn leaf_paths(&self, base: &SchemaPath) -> Vec<SchemaPath> {
        if self.is_leaf() {
            return vec![base.clone()];
        }
        self.children
            .iter()
            .flat_map(|child| child.leaf_paths(&base.join(&child.name)))
            .collect()
    }

    /// Check the sibling-uniqueness and naming invariants of the whole tree.
    pub fn validate(&self) -> Result<()> {
        self.validate_at(&SchemaPath::root())
    }

    fn validate_at(&self, path: &SchemaPath) -> Result<()> {
        let mut seen = HashSet::new();
        for child in &self.children {
            if child.name.is_empty() || child.name.contains('/') {
                return Err(Error::InvalidSchema {
                    path: path.to_string(),
                    message: format!("invalid entry name {:?}", child.name),
                });
            }
            if !seen.insert(child.name.as_str()) {
                return Err(Error::InvalidSchema {
                    path: path.to_string(),
                    message: format!("duplicate entry {:?}", child.name),
                });
            }
            child.validate_at(&path.join(&child.name))?;
        }
        Ok(())
    }
}
