//! Generic expected-vs-observed tree verification and repair
//!
//! The warehouse folders and the configuration keys are both described as a
//! [`SchemaNode`] tree; one verifier and one repairer serve every target:
//! - **node**: schema trees and paths
//! - **observed**: snapshots of the live state
//! - **verify**: diffing a schema against a snapshot
//! - **repair**: creating exactly the missing entries
//! - **presets**: the schemas the distributor ships with

mod node;
mod observed;
pub mod presets;
mod repair;
mod verify;

pub use node::{NodeKind, SchemaNode, SchemaPath};
pub use observed::{ObservedKind, ObservedNode};
pub use repair::{DirectoryTarget, RepairResult, RepairTarget, TreeRepairer, repair_into};
pub use verify::{DiffResult, TreeVerifier, diff};
