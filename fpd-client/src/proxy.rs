//! Stateful handle for one daemon connection, plus the trait seam the CLI
//! session logic is written against.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{io_err, ClientError};
use crate::paths;
use crate::protocol::{self, FpdRequest, Notification};

/// Request surface of the fingerprint daemon.
///
/// Mutating calls are fire-and-forget triggers: the daemon acknowledges
/// immediately and reports outcomes through the notification stream.
/// `fingerprints` returns a point-in-time snapshot that may be stale
/// relative to in-flight operations.
pub trait FingerprintDaemon {
    type Events: Iterator<Item = Result<Notification, ClientError>>;

    fn enroll(&self, finger: &str) -> Result<(), ClientError>;
    fn identify(&self) -> Result<(), ClientError>;
    fn remove(&self, finger: &str) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
    fn fingerprints(&self) -> Result<Vec<String>, ClientError>;
    fn subscribe(&self) -> Result<Self::Events, ClientError>;
}

/// Live handle to the fpd daemon socket. One instance per process.
pub struct FpdProxy {
    socket: PathBuf,
}

impl FpdProxy {
    /// Resolve the socket path and build a handle. Fails when the socket
    /// file is absent so callers get a clear "daemon not running" error
    /// before issuing any request.
    pub fn connect() -> Result<Self, ClientError> {
        let socket = paths::resolve_socket()?;
        if !socket.exists() {
            return Err(ClientError::DaemonNotRunning { socket });
        }
        Ok(Self { socket })
    }

    /// Build a handle against an explicit socket path.
    pub fn at(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    fn trigger(&self, request: &FpdRequest) -> Result<(), ClientError> {
        protocol::send_request(&self.socket, request)?
            .into_data()
            .map(|_| ())
    }
}

impl FingerprintDaemon for FpdProxy {
    type Events = Subscription;

    fn enroll(&self, finger: &str) -> Result<(), ClientError> {
        self.trigger(&FpdRequest::with_finger("enroll", finger))
    }

    fn identify(&self) -> Result<(), ClientError> {
        self.trigger(&FpdRequest::new("identify"))
    }

    fn remove(&self, finger: &str) -> Result<(), ClientError> {
        self.trigger(&FpdRequest::with_finger("remove", finger))
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.trigger(&FpdRequest::new("clear"))
    }

    fn fingerprints(&self) -> Result<Vec<String>, ClientError> {
        let data = protocol::send_request(&self.socket, &FpdRequest::new("list"))?.into_data()?;
        match data {
            Value::Array(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    Value::String(finger) => Ok(finger),
                    other => Err(ClientError::Protocol(format!(
                        "list entry is not a string: {other}"
                    ))),
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(ClientError::Protocol(format!(
                "list payload is not an array: {other}"
            ))),
        }
    }

    fn subscribe(&self) -> Result<Subscription, ClientError> {
        Subscription::open(&self.socket)
    }
}

/// Blocking stream of daemon notifications over a dedicated connection.
///
/// Yields events in delivery order until the daemon closes the connection.
/// There is no timeout: waits on this stream are unbounded by design.
pub struct Subscription {
    reader: BufReader<UnixStream>,
    socket: PathBuf,
}

impl Subscription {
    fn open(socket: &Path) -> Result<Self, ClientError> {
        if !socket.exists() {
            return Err(ClientError::DaemonNotRunning {
                socket: socket.to_path_buf(),
            });
        }

        let mut stream = protocol::connect(socket)?;
        let payload = serde_json::to_string(&FpdRequest::new("subscribe"))?;
        stream
            .write_all(payload.as_bytes())
            .map_err(|e| io_err(socket, e))?;
        stream.write_all(b"\n").map_err(|e| io_err(socket, e))?;
        stream.flush().map_err(|e| io_err(socket, e))?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        let read = reader.read_line(&mut line).map_err(|e| io_err(socket, e))?;
        if read == 0 {
            return Err(ClientError::Protocol(
                "daemon closed connection before acknowledging subscription".to_string(),
            ));
        }
        let ack: crate::protocol::FpdResponse = serde_json::from_str(line.trim_end())?;
        ack.into_data()?;

        Ok(Self {
            reader,
            socket: socket.to_path_buf(),
        })
    }
}

impl Iterator for Subscription {
    type Item = Result<Notification, ClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(io_err(&self.socket, err))),
            }
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Notification>(line.trim_end()) {
                Ok(notification) => {
                    tracing::debug!(?notification, "daemon notification");
                    return Some(Ok(notification));
                }
                Err(err) => return Some(Err(ClientError::Json(err))),
            }
        }
    }
}
