use std::env;
use std::path::{Path, PathBuf};

use crate::error::ClientError;

pub const DAEMON_SOCKET: &str = "fpd.sock";

/// Environment override for the daemon socket location. Used by tests and
/// by systems that run fpd outside the default runtime directory.
pub const SOCKET_ENV: &str = "FPD_SOCKET";

pub fn fpd_root(home: &Path) -> PathBuf {
    home.join(".fpd")
}

pub fn run_dir(home: &Path) -> PathBuf {
    fpd_root(home).join("run")
}

pub fn socket_path(home: &Path) -> PathBuf {
    run_dir(home).join(DAEMON_SOCKET)
}

/// Resolve the daemon socket: `$FPD_SOCKET` when set, otherwise
/// `~/.fpd/run/fpd.sock`.
pub fn resolve_socket() -> Result<PathBuf, ClientError> {
    if let Some(path) = env::var_os(SOCKET_ENV) {
        return Ok(PathBuf::from(path));
    }
    let home = dirs::home_dir().ok_or(ClientError::HomeNotFound)?;
    Ok(socket_path(&home))
}
