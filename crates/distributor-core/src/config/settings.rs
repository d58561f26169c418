//! Typed view of the FTP connection settings

use std::path::{Path, PathBuf};

use distributor_fs::FileSystem;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A port written either as `port = 22` or `port = "22"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(i64),
    Text(String),
}

impl Default for PortValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Connection settings from the `[FTP]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtpSettings {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub port: PortValue,
    /// Seconds before a connection or transfer is abandoned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Local mount point of the server's file tree, used instead of SFTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<PathBuf>,
}

impl FtpSettings {
    /// The port as a number.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigIncomplete`] when empty, [`Error::InvalidValue`] when
    /// not a valid port.
    pub fn port(&self) -> Result<u16> {
        let invalid = |message: String| Error::InvalidValue {
            key: "FTP.port".to_string(),
            message,
        };
        match &self.port {
            PortValue::Number(n) => {
                u16::try_from(*n).map_err(|_| invalid(format!("{} is out of range", n)))
            }
            PortValue::Text(text) if text.trim().is_empty() => Err(Error::ConfigIncomplete {
                keys: vec!["FTP.port".to_string()],
            }),
            PortValue::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| invalid(format!("{:?} is not a port number", text))),
        }
    }

    /// Check that everything needed to open a session is filled in.
    ///
    /// The password may stay empty for key-based logins.
    pub fn validate(&self) -> Result<()> {
        let mut empty = Vec::new();
        if self.host.trim().is_empty() {
            empty.push("FTP.host".to_string());
        }
        if self.user.trim().is_empty() {
            empty.push("FTP.user".to_string());
        }
        if matches!(&self.port, PortValue::Text(t) if t.trim().is_empty()) {
            empty.push("FTP.port".to_string());
        }
        if !empty.is_empty() {
            return Err(Error::ConfigIncomplete { keys: empty });
        }
        self.port().map(|_| ())
    }

    /// `sftp://user@host:port`, for messages. Never contains the password.
    pub fn endpoint(&self) -> String {
        let port = match &self.port {
            PortValue::Number(n) => n.to_string(),
            PortValue::Text(t) => t.clone(),
        };
        format!("sftp://{}@{}:{}", self.user, self.host, port)
    }
}

/// Typed contents of `distribution-config.toml`.
///
/// Keys belonging to other schema variants are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(rename = "FTP", default, skip_serializing_if = "Option::is_none")]
    pub ftp: Option<FtpSettings>,
}

/// Reject values of the wrong type, naming the offending key.
fn check_value_types(table: &toml::Table) -> Result<()> {
    let Some(ftp) = table.get("FTP") else {
        return Ok(());
    };
    let Some(ftp) = ftp.as_table() else {
        return Err(Error::InvalidValue {
            key: "FTP".to_string(),
            message: format!("expected a table, found {}", ftp.type_str()),
        });
    };

    for (key, value) in ftp {
        let expected = match key.as_str() {
            "host" | "user" | "password" | "mount" if !value.is_str() => "a string",
            "port" if !value.is_integer() && !value.is_str() => "a number",
            "timeout" if !value.as_integer().is_some_and(|n| n > 0) => {
                "a positive number of seconds"
            }
            _ => continue,
        };
        return Err(Error::InvalidValue {
            key: format!("FTP.{}", key),
            message: format!("expected {}, found {}", expected, value),
        });
    }
    Ok(())
}

impl DistributionConfig {
    /// Parse configuration content.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidValue`] naming the key when a known key holds a value
    /// of the wrong type.
    pub fn parse(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        check_value_types(&table)?;
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Load the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailure`] naming the file when it is missing or
    /// not TOML, and [`Error::InvalidValue`] naming the key when a value has
    /// the wrong type.
    pub fn load<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<Self> {
        let parse_failure = |message: String| Error::ParseFailure {
            path: path.to_path_buf(),
            message,
        };
        let bytes = fs
            .read_file(path)?
            .ok_or_else(|| parse_failure("file does not exist".to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| parse_failure(e.to_string()))?;
        let table: toml::Table =
            toml::from_str(&text).map_err(|e| parse_failure(e.to_string()))?;
        check_value_types(&table)?;
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| parse_failure(e.to_string()))
    }

    /// The `[FTP]` table, validated.
    pub fn ftp(&self) -> Result<&FtpSettings> {
        let settings = self.ftp.as_ref().ok_or_else(|| Error::ConfigIncomplete {
            keys: vec!["FTP".to_string()],
        })?;
        settings.validate()?;
        Ok(settings)
    }
}
