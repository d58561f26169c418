//! Remote mod store interface
//!
//! The engine reaches the game server only through [`RemoteStore`]. Sessions
//! are opened per category by a [`RemoteConnector`], so a connection failure
//! is confined to the category that needed it.
//!
//! - **sftp**: SSH/SFTP sessions built from the `[FTP]` settings
//! - **directory**: a server tree reachable as a local directory

mod directory;
mod sftp;

use std::path::Path;

use crate::config::FtpSettings;
use crate::reconcile::{ModName, ModSet};

pub use directory::{DirectoryStore, MountConnector};
pub use sftp::{DEFAULT_TIMEOUT, SftpConnector, SftpStore};

/// Failures talking to the remote mod store.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Could not connect to {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    #[error("Authentication failed for {endpoint}")]
    Auth { endpoint: String },

    #[error("Protocol error on {path}: {message}")]
    Protocol { path: String, message: String },

    #[error("Timed out during {operation} on {path}")]
    Timeout { operation: String, path: String },

    #[error("Remote I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn timeout(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
            path: path.into(),
        }
    }
}

/// Result type for remote operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Blocking operations on the server's mod folders.
///
/// Each call is bounded by the implementation's own timeout and reports
/// [`TransportError::Timeout`] when it expires.
pub trait RemoteStore {
    /// Names of the files in `remote_dir`.
    fn list_names(&mut self, remote_dir: &str) -> TransportResult<ModSet>;

    /// Delete `name` from `remote_dir`. Deleting an absent file succeeds.
    fn remove(&mut self, remote_dir: &str, name: &ModName) -> TransportResult<()>;

    /// Upload `local_path` as `remote_dir/name`, replacing any existing file.
    fn put(&mut self, local_path: &Path, remote_dir: &str, name: &ModName) -> TransportResult<()>;
}

/// Opens [`RemoteStore`] sessions from the configured settings.
pub trait RemoteConnector {
    fn connect(&self, settings: &FtpSettings) -> TransportResult<Box<dyn RemoteStore>>;
}

/// Connector used by the binary.
///
/// Opens an SFTP session to `host:port`, unless `[FTP] mount` names a
/// local mount of the server tree, which is then used directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServerConnector {
    sftp: SftpConnector,
}

impl ServerConnector {
    pub fn new(sftp: SftpConnector) -> Self {
        Self { sftp }
    }
}

impl RemoteConnector for ServerConnector {
    fn connect(&self, settings: &FtpSettings) -> TransportResult<Box<dyn RemoteStore>> {
        if settings.mount.is_some() {
            MountConnector.connect(settings)
        } else {
            self.sftp.connect(settings)
        }
    }
}
