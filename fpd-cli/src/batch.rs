//! Single-command mode: run exactly one command to completion, then exit.

use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use fpd_client::{FingerprintDaemon, FpdProxy, Notification, ENROLL_DONE};

use crate::command::{self, Command};

/// Execute one argument-vector command and return the process exit code.
pub fn run(args: &[String]) -> Result<u8> {
    let command = Command::parse_args(args);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Help and usage errors never touch the daemon.
    match command {
        Command::Help => {
            command::print_help(&mut out, false)?;
            Ok(0)
        }
        Command::Exit | Command::Unknown(_) => {
            print_usage_error(&mut out)?;
            Ok(1)
        }
        command => {
            let proxy = FpdProxy::connect().context("cannot reach the fingerprint daemon")?;
            execute(&proxy, command, &mut out)
        }
    }
}

fn print_usage_error<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Unknown command or wrong number of arguments")?;
    command::print_help(out, false)
}

fn execute<D, W>(daemon: &D, command: Command, out: &mut W) -> Result<u8>
where
    D: FingerprintDaemon,
    W: Write,
{
    match command {
        Command::List => {
            let fingers = daemon.fingerprints()?;
            if fingers.is_empty() {
                return Ok(1);
            }
            writeln!(out, "{}", fingers.join(", "))?;
            Ok(0)
        }
        Command::Enroll(finger) => {
            if daemon.fingerprints()?.contains(&finger) {
                writeln!(out, "Fingerprint already enrolled: {finger}")?;
                return Ok(1);
            }
            let events = daemon.subscribe()?;
            daemon.enroll(&finger)?;
            for event in events {
                // Only the terminal progress value ends this wait; Failed
                // and Aborted during enrollment do not unblock it.
                if let Notification::EnrollProgressChanged(progress) = event? {
                    if progress == ENROLL_DONE {
                        return Ok(0);
                    }
                    writeln!(out, "{progress}")?;
                    out.flush()?;
                }
            }
            Err(anyhow!("notification stream ended before enrollment completed"))
        }
        Command::Remove(finger) => {
            if !daemon.fingerprints()?.contains(&finger) {
                return Ok(1);
            }
            daemon.remove(&finger)?;
            Ok(0)
        }
        Command::Identify => {
            let events = daemon.subscribe()?;
            daemon.identify()?;
            for event in events {
                if let Notification::Identified(finger) = event? {
                    writeln!(out, "{finger}")?;
                    return Ok(0);
                }
            }
            Err(anyhow!(
                "notification stream ended before identification completed"
            ))
        }
        Command::Clear => {
            daemon.clear()?;
            Ok(0)
        }
        Command::Help => {
            command::print_help(out, false)?;
            Ok(0)
        }
        Command::Exit | Command::Unknown(_) => {
            print_usage_error(out)?;
            Ok(1)
        }
    }
}
