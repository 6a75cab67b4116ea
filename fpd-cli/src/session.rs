//! Interactive session: one logical event loop multiplexing operator input
//! and daemon notifications.
//!
//! The loop owns all printing; the stdin and subscription reader threads
//! only move events into the channel, so command dispatch and notification
//! handling never interleave within an iteration.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::mpsc::Receiver;

use anyhow::Result;
use colored::Colorize;
use fpd_client::{FingerprintDaemon, Notification, ENROLL_DONE, UNRECOGNIZED_ACQUISITION};

use crate::command::{self, Command};

/// One unit of work for the session loop, from either event source.
pub enum SessionEvent {
    Line(String),
    Eof,
    Notice(Notification),
}

enum Flow {
    Continue,
    Exit,
    AwaitEnroll,
}

/// Run the interactive session until `exit`, a blank line, or end of input.
///
/// `events` is invoked after the startup prints so that the help text and
/// snapshot precede any notification output, matching the subscribe-after-
/// greeting startup order.
pub fn run<D, W, F>(daemon: &D, out: &mut W, events: F) -> Result<()>
where
    D: FingerprintDaemon,
    W: Write,
    F: FnOnce() -> Result<Receiver<SessionEvent>>,
{
    command::print_help(out, true)?;
    print_snapshot(daemon, out)?;
    out.flush()?;
    let events = events()?;

    // While an enrollment is in flight, incoming lines are queued rather
    // than executed; only progress reaching ENROLL_DONE reopens the loop.
    let mut awaiting_enroll = false;
    let mut pending = VecDeque::<String>::new();
    let mut eof_seen = false;

    'session: while let Ok(event) = events.recv() {
        match event {
            SessionEvent::Notice(notification) => {
                let completed =
                    matches!(notification, Notification::EnrollProgressChanged(ENROLL_DONE));
                render_notification(&notification, out)?;
                if completed {
                    writeln!(
                        out,
                        "Enrollment complete! You can now execute another command."
                    )?;
                    if awaiting_enroll {
                        awaiting_enroll = false;
                        while !awaiting_enroll {
                            let Some(line) = pending.pop_front() else {
                                break;
                            };
                            match dispatch_line(daemon, &line, out)? {
                                Flow::Continue => {}
                                Flow::Exit => break 'session,
                                Flow::AwaitEnroll => awaiting_enroll = true,
                            }
                        }
                        if !awaiting_enroll && eof_seen {
                            break 'session;
                        }
                    }
                }
            }
            SessionEvent::Line(line) => {
                if awaiting_enroll {
                    pending.push_back(line);
                    continue;
                }
                match dispatch_line(daemon, &line, out)? {
                    Flow::Continue => {}
                    Flow::Exit => break 'session,
                    Flow::AwaitEnroll => awaiting_enroll = true,
                }
            }
            SessionEvent::Eof => {
                if awaiting_enroll {
                    eof_seen = true;
                } else {
                    break 'session;
                }
            }
        }
        out.flush()?;
    }

    out.flush()?;
    Ok(())
}

fn dispatch_line<D, W>(daemon: &D, line: &str, out: &mut W) -> Result<Flow>
where
    D: FingerprintDaemon,
    W: Write,
{
    // A blank line ends the session the same way end-of-input does.
    if line.trim().is_empty() {
        return Ok(Flow::Exit);
    }

    match Command::parse_line(line) {
        Command::Enroll(finger) => {
            let snapshot = daemon.fingerprints()?;
            if snapshot.iter().any(|f| *f == finger) {
                writeln!(out, "Fingerprint already enrolled: {finger}")?;
                return Ok(Flow::Continue);
            }
            writeln!(out, "Enrolling finger: {finger}")?;
            daemon.enroll(&finger)?;
            Ok(Flow::AwaitEnroll)
        }
        Command::Identify => {
            writeln!(out, "Identifying...")?;
            daemon.identify()?;
            Ok(Flow::Continue)
        }
        Command::Remove(finger) => {
            let snapshot = daemon.fingerprints()?;
            if !snapshot.iter().any(|f| *f == finger) {
                writeln!(out, "Fingerprint not enrolled: {finger}")?;
                return Ok(Flow::Continue);
            }
            writeln!(out, "Removing finger: {finger}")?;
            daemon.remove(&finger)?;
            Ok(Flow::Continue)
        }
        Command::Clear => {
            writeln!(out, "All fingerprints have been cleared.")?;
            daemon.clear()?;
            Ok(Flow::Continue)
        }
        Command::List => {
            print_snapshot(daemon, out)?;
            Ok(Flow::Continue)
        }
        Command::Help => {
            command::print_help(out, true)?;
            Ok(Flow::Continue)
        }
        Command::Exit => {
            writeln!(out, "Exiting.")?;
            Ok(Flow::Exit)
        }
        Command::Unknown(raw) => {
            writeln!(out, "Unknown command: {raw}")?;
            Ok(Flow::Continue)
        }
    }
}

fn print_snapshot<D, W>(daemon: &D, out: &mut W) -> Result<()>
where
    D: FingerprintDaemon,
    W: Write,
{
    let fingers = daemon.fingerprints()?;
    if fingers.is_empty() {
        writeln!(out, "No enrolled fingers.")?;
    } else {
        writeln!(out, "Enrolled fingers: {}", fingers.join(", "))?;
    }
    Ok(())
}

/// One status line per notification, in delivery order.
fn render_notification<W: Write>(notification: &Notification, out: &mut W) -> io::Result<()> {
    match notification {
        Notification::ConnectionStateChanged => writeln!(out, "Connection state changed"),
        Notification::FingerprintsChanged => writeln!(out, "Fingerprints changed"),
        Notification::StateChanged(state) => writeln!(out, "State changed: {state}"),
        Notification::EnrollProgressChanged(progress) => {
            writeln!(out, "Enroll progress changed: {progress}")
        }
        Notification::AcquisitionInfo(info) => {
            if info == UNRECOGNIZED_ACQUISITION {
                Ok(())
            } else {
                writeln!(out, "Acquisition info: {info}")
            }
        }
        Notification::ErrorInfo(info) => writeln!(out, "{}", format!("Error info: {info}").red()),
        Notification::Added(finger) => writeln!(out, "Added finger: {finger}"),
        Notification::Removed(finger) => writeln!(out, "Removed finger: {finger}"),
        Notification::Identified(finger) => writeln!(out, "Identified finger: {finger}"),
        Notification::Aborted => writeln!(out, "Operation aborted"),
        Notification::Failed => writeln!(out, "{}", "Operation failed".red()),
        Notification::Verified => writeln!(out, "{}", "Verification successful".green()),
    }
}
