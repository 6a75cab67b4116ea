//! Command parsing for interactive lines and single-command invocations.

use std::io::{self, Write};

/// One user command, parsed once per input line or process invocation.
///
/// Parsing is total: anything unrecognized becomes `Unknown` carrying the
/// original text verbatim, reported later as a user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Enroll(String),
    Identify,
    Remove(String),
    Clear,
    List,
    Help,
    Exit,
    Unknown(String),
}

impl Command {
    /// Parse one interactive input line. Verbs are case-sensitive; the
    /// finger is the remainder of the line after the first space, trimmed.
    pub fn parse_line(line: &str) -> Self {
        if let Some(rest) = line.strip_prefix("enroll ") {
            return match non_empty(rest) {
                Some(finger) => Self::Enroll(finger),
                None => Self::Unknown(line.to_string()),
            };
        }
        if let Some(rest) = line
            .strip_prefix("remove ")
            .or_else(|| line.strip_prefix("rm "))
        {
            return match non_empty(rest) {
                Some(finger) => Self::Remove(finger),
                None => Self::Unknown(line.to_string()),
            };
        }

        match line {
            "identify" => Self::Identify,
            "clear" | "cls" => Self::Clear,
            "list" | "ls" => Self::List,
            "help" | "-h" | "--help" => Self::Help,
            "exit" | "q" | "quit" => Self::Exit,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Parse a single-command argument vector. Arity is part of the match:
    /// a recognized verb with the wrong argument count yields `Unknown`.
    /// `exit`/`q`/`quit` are interactive-only and fall through to `Unknown`.
    pub fn parse_args(args: &[String]) -> Self {
        let Some(verb) = args.first() else {
            return Self::Unknown(String::new());
        };

        match (verb.as_str(), args.len()) {
            ("enroll", 2) => match non_empty(&args[1]) {
                Some(finger) => Self::Enroll(finger),
                None => Self::Unknown(args.join(" ")),
            },
            ("remove" | "rm", 2) => match non_empty(&args[1]) {
                Some(finger) => Self::Remove(finger),
                None => Self::Unknown(args.join(" ")),
            },
            ("identify", 1) => Self::Identify,
            ("clear" | "cls", 1) => Self::Clear,
            ("list" | "ls", 1) => Self::List,
            ("help" | "-h" | "--help", 1) => Self::Help,
            _ => Self::Unknown(args.join(" ")),
        }
    }
}

fn non_empty(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Print the command reference. The interactive variant adds the exit line.
pub fn print_help<W: Write>(out: &mut W, interactive: bool) -> io::Result<()> {
    writeln!(out, "Available commands:")?;
    writeln!(
        out,
        "enroll <finger>: Start the enrollment process for the specified finger"
    )?;
    writeln!(out, "identify: Start the identification process")?;
    writeln!(out, "remove <finger>: Remove the specified finger")?;
    writeln!(out, "clear/cls: Clear all fingerprints")?;
    writeln!(out, "list/ls: List all enrolled fingers")?;
    writeln!(out, "help/-h/--help: Display this help message")?;
    if interactive {
        writeln!(out, "exit/q/quit: Exit the program")?;
    }
    Ok(())
}
