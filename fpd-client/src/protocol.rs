use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{io_err, ClientError};

/// Terminal value of the enrollment progress stream.
pub const ENROLL_DONE: u32 = 100;

/// Acquisition status the daemon emits for unmatched sensor reads; the CLI
/// suppresses it to keep the status stream readable.
pub const UNRECOGNIZED_ACQUISITION: &str = "FPACQUIRED_UNRECOGNIZED";

/// JSON newline-delimited request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpdRequest {
    pub cmd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finger: Option<String>,
}

impl FpdRequest {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            finger: None,
        }
    }

    pub fn with_finger(cmd: impl Into<String>, finger: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            finger: Some(finger.into()),
        }
    }
}

/// JSON newline-delimited response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpdResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FpdResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwrap the payload of a successful response, or map a daemon-side
    /// refusal to a protocol error.
    pub fn into_data(self) -> Result<Value, ClientError> {
        if self.ok {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(ClientError::Protocol(
                self.error
                    .unwrap_or_else(|| "unknown daemon error".to_string()),
            ))
        }
    }
}

/// Asynchronous event emitted by the daemon on a subscription stream.
///
/// Delivery is at-least-once and in daemon order; the client performs no
/// buffering or deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Notification {
    ConnectionStateChanged,
    FingerprintsChanged,
    StateChanged(String),
    EnrollProgressChanged(u32),
    AcquisitionInfo(String),
    ErrorInfo(String),
    Added(String),
    Removed(String),
    Identified(String),
    Aborted,
    Failed,
    Verified,
}

/// Send one JSON request to the daemon socket and return one response.
pub fn send_request(socket: &Path, request: &FpdRequest) -> Result<FpdResponse, ClientError> {
    if !socket.exists() {
        return Err(ClientError::DaemonNotRunning {
            socket: socket.to_path_buf(),
        });
    }

    let mut stream = connect(socket)?;
    tracing::debug!(cmd = %request.cmd, "sending daemon request");

    let payload = serde_json::to_string(request)?;
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
            "daemon closed connection before responding".to_string(),
        ));
    }

    let response: FpdResponse = serde_json::from_str(line.trim_end())?;
    Ok(response)
}

pub(crate) fn connect(socket: &Path) -> Result<UnixStream, ClientError> {
    UnixStream::connect(socket).map_err(|err| {
        if matches!(
            err.kind(),
            std::io::ErrorKind::NotFound
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
        ) {
            ClientError::DaemonNotRunning {
                socket: socket.to_path_buf(),
            }
        } else {
            io_err(socket, err)
        }
    })
}
