//! Scripted fake fpd daemon for integration tests.
//!
//! Binds a real Unix socket in a temp directory, answers the JSON line
//! protocol, and replays configured notifications on the subscription
//! connection when a matching request arrives.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use fpd_client::Notification;
use tempfile::TempDir;

pub struct FakeFpd {
    socket: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
    _dir: TempDir,
}

impl FakeFpd {
    /// Start the fake daemon. `reactions` maps a request cmd to the
    /// notifications streamed to the subscriber once that cmd arrives.
    pub fn spawn(fingers: &[&str], reactions: &[(&str, &[Notification])]) -> Self {
        let dir = TempDir::new().expect("socket dir");
        let socket = dir.path().join("fpd.sock");
        let listener = UnixListener::bind(&socket).expect("bind fake daemon socket");

        let fingers: Vec<String> = fingers.iter().map(|f| f.to_string()).collect();
        let reactions: Vec<(String, Vec<Notification>)> = reactions
            .iter()
            .map(|(cmd, events)| (cmd.to_string(), events.to_vec()))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));

        {
            let requests = requests.clone();
            thread::spawn(move || {
                let subscriber: Mutex<Option<UnixStream>> = Mutex::new(None);
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { break };
                    handle_connection(stream, &fingers, &reactions, &requests, &subscriber);
                }
            });
        }

        Self {
            socket,
            requests,
            _dir: dir,
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Every non-subscribe request received so far, as "cmd" or "cmd finger".
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests").clone()
    }
}

fn handle_connection(
    stream: UnixStream,
    fingers: &[String],
    reactions: &[(String, Vec<Notification>)],
    requests: &Arc<Mutex<Vec<String>>>,
    subscriber: &Mutex<Option<UnixStream>>,
) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut line = String::new();
    if reader.read_line(&mut line).unwrap_or(0) == 0 {
        return;
    }
    let Ok(request) = serde_json::from_str::<serde_json::Value>(line.trim_end()) else {
        return;
    };
    let cmd = request["cmd"].as_str().unwrap_or_default().to_string();
    let finger = request["finger"].as_str().map(str::to_string);

    let mut stream = stream;
    match cmd.as_str() {
        "subscribe" => {
            write_line(&mut stream, r#"{"ok":true}"#);
            *subscriber.lock().expect("subscriber slot") = Some(stream);
        }
        "list" => {
            requests.lock().expect("requests").push("list".to_string());
            let payload = serde_json::json!({ "ok": true, "data": fingers });
            write_line(&mut stream, &payload.to_string());
        }
        other => {
            let logged = match &finger {
                Some(finger) => format!("{other} {finger}"),
                None => other.to_string(),
            };
            requests.lock().expect("requests").push(logged);
            write_line(&mut stream, r#"{"ok":true,"data":null}"#);

            if let Some((_, events)) = reactions.iter().find(|(c, _)| c == other) {
                if let Some(sub) = subscriber.lock().expect("subscriber slot").as_mut() {
                    for event in events {
                        write_line(sub, &serde_json::to_string(event).expect("encode event"));
                    }
                }
            }
        }
    }
}

fn write_line(stream: &mut UnixStream, payload: &str) {
    let _ = stream.write_all(payload.as_bytes());
    let _ = stream.write_all(b"\n");
    let _ = stream.flush();
}
