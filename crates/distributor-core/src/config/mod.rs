//! Configuration file handling
//!
//! - **document**: schema verification and format-preserving repair
//! - **settings**: typed access to the connection settings

mod document;
mod settings;

pub use document::{ConfigReport, ConfigStatus, default_document, verify_and_repair};
pub use settings::{DistributionConfig, FtpSettings, PortValue};
