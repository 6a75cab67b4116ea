//! fpdclient — command-line client for the fpd fingerprint daemon.
//!
//! # Usage
//!
//! ```text
//! fpdclient                      interactive session
//! fpdclient list|ls              print enrolled fingers
//! fpdclient enroll <finger>      enroll, streaming progress values
//! fpdclient remove <finger>      remove one template
//! fpdclient identify             identify a live sensor read
//! fpdclient clear|cls            remove all templates
//! fpdclient help|-h|--help       command reference
//! ```
//!
//! With no arguments the client runs an interactive session; with at least
//! one argument it runs a single command and exits. The daemon does the
//! actual sensor and matching work; results arrive as notifications.

mod batch;
mod command;
mod session;
#[cfg(test)]
mod testing;

use std::env;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use fpd_client::{FingerprintDaemon, FpdProxy, Subscription};

use session::SessionEvent;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<u8> {
    if args.is_empty() {
        interactive()?;
        Ok(0)
    } else {
        batch::run(args)
    }
}

fn interactive() -> Result<()> {
    let proxy = FpdProxy::connect().context("cannot reach the fingerprint daemon")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    session::run(&proxy, &mut out, || {
        let (tx, rx) = mpsc::channel();
        let subscription = proxy
            .subscribe()
            .context("failed to subscribe to daemon notifications")?;
        pump_notifications(subscription, tx.clone());
        pump_stdin(tx);
        Ok(rx)
    })
}

fn pump_notifications(subscription: Subscription, tx: mpsc::Sender<SessionEvent>) {
    thread::spawn(move || {
        for event in subscription {
            match event {
                Ok(notification) => {
                    if tx.send(SessionEvent::Notice(notification)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "notification stream error");
                    break;
                }
            }
        }
    });
}

fn pump_stdin(tx: mpsc::Sender<SessionEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(SessionEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(SessionEvent::Eof);
    });
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
