//! Server trees reachable as a local directory

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{RemoteConnector, RemoteStore, TransportError, TransportResult};
use crate::config::FtpSettings;
use crate::reconcile::{ModName, ModSet};

/// [`RemoteStore`] over a server file tree reachable as a local directory,
/// e.g. a network mount or a server installed on the same machine.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dir(&self, remote_dir: &str) -> PathBuf {
        self.root.join(remote_dir.trim_start_matches("./"))
    }
}

impl RemoteStore for DirectoryStore {
    fn list_names(&mut self, remote_dir: &str) -> TransportResult<ModSet> {
        let dir = self.dir(remote_dir);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "Remote folder does not exist yet");
                return Ok(ModSet::new());
            }
            Err(e) => return Err(TransportError::io(dir.display().to_string(), e)),
        };

        let mut names = ModSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| TransportError::io(dir.display().to_string(), e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| TransportError::io(entry.path().display().to_string(), e))?
                .is_file();
            if is_file {
                names.insert(ModName::new(entry.file_name().to_string_lossy().into_owned()));
            }
        }
        Ok(names)
    }

    fn remove(&mut self, remote_dir: &str, name: &ModName) -> TransportResult<()> {
        let path = self.dir(remote_dir).join(name.as_str());
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TransportError::io(path.display().to_string(), e)),
        }
    }

    fn put(&mut self, local_path: &Path, remote_dir: &str, name: &ModName) -> TransportResult<()> {
        let dir = self.dir(remote_dir);
        fs::create_dir_all(&dir).map_err(|e| TransportError::io(dir.display().to_string(), e))?;

        // The server must never load a half-copied jar
        let target = dir.join(name.as_str());
        let partial = dir.join(format!(".{}.part", name));
        fs::copy(local_path, &partial)
            .map_err(|e| TransportError::io(partial.display().to_string(), e))?;
        fs::rename(&partial, &target)
            .map_err(|e| TransportError::io(target.display().to_string(), e))?;
        Ok(())
    }
}

/// Connector for servers exposed through `[FTP] mount`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MountConnector;

impl RemoteConnector for MountConnector {
    fn connect(&self, settings: &FtpSettings) -> TransportResult<Box<dyn RemoteStore>> {
        let Some(mount) = &settings.mount else {
            return Err(TransportError::Connection {
                endpoint: settings.endpoint(),
                message: "no mount point configured".to_string(),
            });
        };
        if !mount.is_dir() {
            return Err(TransportError::Connection {
                endpoint: settings.endpoint(),
                message: format!("mount point {} is not available", mount.display()),
            });
        }
        debug!(
            endpoint = %settings.endpoint(),
            mount = %mount.display(),
            "Using mounted server tree"
        );
        Ok(Box::new(DirectoryStore::new(mount.clone())))
    }
}
