//! SSH/SFTP transport built from the `[FTP]` settings

use std::fs::File;
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ssh2::{ErrorCode, Session, Sftp};
use tracing::{debug, info};

use super::{RemoteConnector, RemoteStore, TransportError, TransportResult};
use crate::config::FtpSettings;
use crate::reconcile::{ModName, ModSet};

/// Bound on connecting and on every blocking session call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// libssh2 status codes
const SESSION_TIMEOUT: i32 = -9;
const SFTP_NO_SUCH_FILE: i32 = 2;
const SFTP_NO_SUCH_PATH: i32 = 10;

fn is_timeout(error: &ssh2::Error) -> bool {
    matches!(error.code(), ErrorCode::Session(SESSION_TIMEOUT))
}

fn is_missing(error: &ssh2::Error) -> bool {
    matches!(
        error.code(),
        ErrorCode::SFTP(SFTP_NO_SUCH_FILE) | ErrorCode::SFTP(SFTP_NO_SUCH_PATH)
    )
}

/// Map a failed SFTP request on `path`.
fn request_error(error: ssh2::Error, operation: &str, path: &Path) -> TransportError {
    let path = path.display().to_string();
    if is_timeout(&error) {
        TransportError::timeout(operation, path)
    } else {
        TransportError::Protocol {
            path,
            message: format!("{} failed: {}", operation, error),
        }
    }
}

/// Opens SFTP sessions with password or agent authentication.
///
/// An empty password selects the SSH agent, for key-based logins.
#[derive(Debug, Clone, Copy)]
pub struct SftpConnector {
    timeout: Duration,
}

impl Default for SftpConnector {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SftpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the default timeout. `[FTP] timeout` still takes precedence.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn timeout_for(&self, settings: &FtpSettings) -> Duration {
        settings
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(self.timeout)
    }
}

impl RemoteConnector for SftpConnector {
    fn connect(&self, settings: &FtpSettings) -> TransportResult<Box<dyn RemoteStore>> {
        let endpoint = settings.endpoint();
        let connection = |message: String| TransportError::Connection {
            endpoint: endpoint.clone(),
            message,
        };
        let port = settings.port().map_err(|e| connection(e.to_string()))?;
        let timeout = self.timeout_for(settings);

        let addr: SocketAddr = (settings.host.trim(), port)
            .to_socket_addrs()
            .map_err(|e| connection(format!("cannot resolve host: {}", e)))?
            .next()
            .ok_or_else(|| connection("host resolved to no address".to_string()))?;
        let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| match e.kind() {
            ErrorKind::TimedOut => TransportError::timeout("connect", &endpoint),
            _ => connection(e.to_string()),
        })?;
        debug!(endpoint = %endpoint, %addr, "TCP connection established");

        let mut session = Session::new().map_err(|e| connection(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
        session.handshake().map_err(|e| {
            if is_timeout(&e) {
                TransportError::timeout("handshake", &endpoint)
            } else {
                connection(format!("SSH handshake failed: {}", e))
            }
        })?;

        let auth = if settings.password.is_empty() {
            session.userauth_agent(&settings.user)
        } else {
            session.userauth_password(&settings.user, &settings.password)
        };
        match auth {
            Err(e) if is_timeout(&e) => {
                return Err(TransportError::timeout("authentication", &endpoint));
            }
            Err(e) => {
                debug!(endpoint = %endpoint, error = %e, "Authentication rejected");
                return Err(TransportError::Auth { endpoint });
            }
            Ok(()) if !session.authenticated() => return Err(TransportError::Auth { endpoint }),
            Ok(()) => {}
        }

        let sftp = session.sftp().map_err(|e| {
            request_error(e, "opening the SFTP subsystem", Path::new(&endpoint))
        })?;
        info!(endpoint = %endpoint, "Connected to server");
        Ok(Box::new(SftpStore {
            sftp,
            _session: session,
        }))
    }
}

/// [`RemoteStore`] over an authenticated SFTP session.
pub struct SftpStore {
    sftp: Sftp,
    _session: Session,
}

impl SftpStore {
    fn ensure_dir(&self, dir: &Path) -> TransportResult<()> {
        match self.sftp.stat(dir) {
            Ok(_) => Ok(()),
            Err(e) if is_missing(&e) => {
                debug!(dir = %dir.display(), "Creating remote folder");
                self.sftp
                    .mkdir(dir, 0o755)
                    .map_err(|e| request_error(e, "mkdir", dir))
            }
            Err(e) => Err(request_error(e, "stat", dir)),
        }
    }
}

impl RemoteStore for SftpStore {
    fn list_names(&mut self, remote_dir: &str) -> TransportResult<ModSet> {
        let dir = Path::new(remote_dir);
        let entries = match self.sftp.readdir(dir) {
            Ok(entries) => entries,
            Err(e) if is_missing(&e) => {
                debug!(dir = remote_dir, "Remote folder does not exist yet");
                return Ok(ModSet::new());
            }
            Err(e) => return Err(request_error(e, "list", dir)),
        };

        Ok(entries
            .into_iter()
            .filter(|(_, stat)| stat.is_file())
            .filter_map(|(path, _)| {
                path.file_name()
                    .map(|name| ModName::new(name.to_string_lossy().into_owned()))
            })
            .collect())
    }

    fn remove(&mut self, remote_dir: &str, name: &ModName) -> TransportResult<()> {
        let path = Path::new(remote_dir).join(name.as_str());
        match self.sftp.unlink(&path) {
            Ok(()) => Ok(()),
            Err(e) if is_missing(&e) => Ok(()),
            Err(e) => Err(request_error(e, "delete", &path)),
        }
    }

    fn put(&mut self, local_path: &Path, remote_dir: &str, name: &ModName) -> TransportResult<()> {
        let dir = Path::new(remote_dir);
        self.ensure_dir(dir)?;

        let target = dir.join(name.as_str());
        let partial: PathBuf = dir.join(format!(".{}.part", name));
        let mut local = File::open(local_path)
            .map_err(|e| TransportError::io(local_path.display().to_string(), e))?;
        let mut remote = self
            .sftp
            .create(&partial)
            .map_err(|e| request_error(e, "upload", &partial))?;
        io::copy(&mut local, &mut remote).map_err(|e| match e.kind() {
            ErrorKind::TimedOut => TransportError::timeout("upload", partial.display().to_string()),
            _ => TransportError::io(partial.display().to_string(), e),
        })?;
        drop(remote);

        // Plain SFTP rename refuses to overwrite
        if let Err(e) = self.sftp.unlink(&target)
            && !is_missing(&e)
        {
            return Err(request_error(e, "replace", &target));
        }
        self.sftp
            .rename(&partial, &target, None)
            .map_err(|e| request_error(e, "rename", &target))
    }
}
