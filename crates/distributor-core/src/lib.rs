//! State reconciliation engine for the mod distributor
//!
//! Keeps a local `mod_warehouse` tree, its configuration file and a game
//! server's mod folder converged:
//!
//! - **schema**: generic expected-vs-observed tree verification and repair
//! - **config**: `distribution-config.toml` verification, repair and typed access
//! - **reconcile**: set difference between local and remote mods
//! - **archive**: per-category zip archives
//! - **remote**: the remote mod store interface and its SFTP transport
//! - **sync**: the orchestrator sequencing all of the above
//!
//! # Architecture
//!
//! ```text
//!              distributor-cli
//!                     |
//!             distributor-core
//!                     |
//!              distributor-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use distributor_core::{ServerConnector, SyncOrchestrator};
//! use distributor_fs::LocalFileSystem;
//!
//! let fs = LocalFileSystem::new();
//! let report = SyncOrchestrator::new(&fs, ".", ServerConnector::default()).run()?;
//! println!("uploaded {} mods", report.mods_uploaded());
//! # Ok::<(), distributor_core::Error>(())
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod remote;
pub mod schema;
pub mod sync;
pub mod warehouse;

pub use archive::{ArchiveOutcome, Archiver, ZipArchiver};
pub use config::{ConfigReport, ConfigStatus, DistributionConfig, FtpSettings};
pub use error::{Error, Result};
pub use reconcile::{ModName, ModSet, ReconciliationPlan, reconcile};
pub use remote::{
    DirectoryStore, MountConnector, RemoteConnector, RemoteStore, ServerConnector, SftpConnector,
    SftpStore, TransportError, TransportResult,
};
pub use schema::{
    DiffResult, NodeKind, RepairResult, SchemaNode, SchemaPath, TreeRepairer, TreeVerifier,
};
pub use sync::{
    CategoryReport, CategorySync, ConvergenceReport, RunState, SyncObserver, SyncOptions,
    SyncOrchestrator, SyncReport,
};
pub use warehouse::{ModCategory, Warehouse};
