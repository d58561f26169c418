//! In-memory remote store shared by the orchestrator tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use distributor_core::{
    FtpSettings, ModName, ModSet, RemoteConnector, RemoteStore, TransportError, TransportResult,
};

/// One call made against the fake server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Remove(String, String),
    Put(String, String),
}

#[derive(Debug, Default)]
pub struct ServerState {
    pub mods: ModSet,
    pub calls: Vec<Call>,
    /// Fail the put of this mod with a timeout
    pub fail_put: Option<String>,
    pub refuse_connection: bool,
}

/// Fake server whose state outlives the sessions opened on it.
#[derive(Debug, Clone, Default)]
pub struct FakeServer(pub Rc<RefCell<ServerState>>);

impl FakeServer {
    pub fn with_mods(names: &[&str]) -> Self {
        let server = Self::default();
        server.0.borrow_mut().mods = names.iter().map(|n| ModName::from(*n)).collect();
        server
    }

    pub fn mods(&self) -> Vec<String> {
        self.0.borrow().mods.iter().map(ToString::to_string).collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }
}

struct Session(Rc<RefCell<ServerState>>);

impl RemoteStore for Session {
    fn list_names(&mut self, remote_dir: &str) -> TransportResult<ModSet> {
        let mut state = self.0.borrow_mut();
        state.calls.push(Call::List(remote_dir.to_string()));
        Ok(state.mods.clone())
    }

    fn remove(&mut self, remote_dir: &str, name: &ModName) -> TransportResult<()> {
        let mut state = self.0.borrow_mut();
        state
            .calls
            .push(Call::Remove(remote_dir.to_string(), name.to_string()));
        state.mods.remove(name);
        Ok(())
    }

    fn put(&mut self, local_path: &Path, remote_dir: &str, name: &ModName) -> TransportResult<()> {
        let mut state = self.0.borrow_mut();
        if state.fail_put.as_deref() == Some(name.as_str()) {
            return Err(TransportError::Timeout {
                operation: "upload".to_string(),
                path: format!("{}/{}", remote_dir, name),
            });
        }
        assert!(local_path.is_file(), "uploading missing file {}", local_path.display());
        state
            .calls
            .push(Call::Put(remote_dir.to_string(), name.to_string()));
        state.mods.insert(name.clone());
        Ok(())
    }
}

impl RemoteConnector for FakeServer {
    fn connect(&self, settings: &FtpSettings) -> TransportResult<Box<dyn RemoteStore>> {
        if self.0.borrow().refuse_connection {
            return Err(TransportError::Connection {
                endpoint: settings.endpoint(),
                message: "connection refused".to_string(),
            });
        }
        Ok(Box::new(Session(Rc::clone(&self.0))))
    }
}

pub const COMPLETE_CONFIG: &str =
    "[FTP]\nhost = \"mc.example.org\"\nuser = \"ops\"\npassword = \"secret\"\nport = 22\n";
