//! Error types for distributor-core

use std::path::PathBuf;

use crate::remote::TransportError;

/// Result type for distributor-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in distributor-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A directory exists but could not be listed
    #[error("Cannot scan {path}: {source}")]
    ScanFailure {
        path: PathBuf,
        #[source]
        source: distributor_fs::Error,
    },

    /// A missing entry could not be created
    #[error("Cannot create {path}: {source}")]
    RepairFailure {
        path: PathBuf,
        #[source]
        source: distributor_fs::Error,
    },

    /// Structurally invalid configuration. Recovered by regenerating defaults.
    #[error("Failed to parse {path}: {message}")]
    ParseFailure { path: PathBuf, message: String },

    /// A schema tree breaks its own invariants
    #[error("Invalid schema at '{path}': {message}")]
    InvalidSchema { path: String, message: String },

    /// Required configuration values are empty
    #[error("Configuration is incomplete, fill in: {}", keys.join(", "))]
    ConfigIncomplete { keys: Vec<String> },

    /// A configuration value is present but unusable
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// An archive could not be produced
    #[error("Cannot archive into {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// Remote mod store failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Filesystem error from distributor-fs
    #[error(transparent)]
    Fs(#[from] distributor_fs::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
