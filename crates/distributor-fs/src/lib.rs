//! Filesystem provider for the mod distributor
//!
//! Provides directory listing, idempotent directory creation and safe
//! byte-level I/O for the warehouse and its configuration file.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod provider;

pub use constants::WarehousePath;
pub use error::{Error, Result};
pub use provider::{CreateOutcome, DirEntry, EntryKind, FileSystem, LocalFileSystem};
