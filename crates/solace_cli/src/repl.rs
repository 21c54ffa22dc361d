//! Interactive line loop: slash commands plus conversation turns.

use anyhow::{Context, Result};
use solace_core::ToneStyle;
use solace_dialogue::DialogueSession;
use std::io::{BufRead, Write};

const HELP: &str = "\
Commands:
  /reset           start the conversation over
  /status          show state, tone, mood and topics
  /tone <style>    switch tone (soft, empathetic, calming, uplifting, reassuring, encouraging, direct, balanced)
  /export <path>   save the transcript to a file
  /help            show this message
Type 'exit' or 'quit' to say goodbye.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset,
    Status,
    Tone(Option<String>),
    Export(Option<String>),
    Help,
    Unknown(String),
}

impl Command {
    /// Parse a slash command. Returns `None` for ordinary utterances.
    pub fn parse(line: &str) -> Option<Command> {
        let rest = line.trim().strip_prefix('/')?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("").to_lowercase();
        let arg = parts
            .next()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        Some(match name.as_str() {
            "reset" => Command::Reset,
            "status" => Command::Status,
            "tone" => Command::Tone(arg),
            "export" => Command::Export(arg),
            "help" | "?" => Command::Help,
            _ => Command::Unknown(name),
        })
    }
}

/// `exit` and `quit` end the session after being answered as a farewell.
pub fn is_exit(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

pub fn run<R: BufRead, W: Write>(
    session: &mut DialogueSession,
    input: R,
    out: &mut W,
) -> Result<()> {
    writeln!(
        out,
        "Solace is here. Type /help for commands, 'exit' to leave."
    )?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            write!(out, "> ")?;
            out.flush()?;
            continue;
        }

        if let Some(command) = Command::parse(trimmed) {
            execute(session, command, out)?;
        } else {
            let outcome = session.handle_turn(trimmed);
            writeln!(out, "\nSolace: {}\n", outcome.reply)?;
            if is_exit(trimmed) {
                tracing::info!("Session {} ended by user", session.id());
                return Ok(());
            }
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    writeln!(out)?;
    tracing::info!("Input closed, ending session {}", session.id());
    Ok(())
}

fn execute<W: Write>(session: &mut DialogueSession, command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::Reset => {
            session.reset();
            writeln!(out, "Conversation reset.")?;
        }
        Command::Status => {
            let status = session.status();
            writeln!(out, "State:    {}", status.state)?;
            writeln!(out, "Tone:     {}", status.tone)?;
            writeln!(
                out,
                "Turns:    {} ({} min)",
                status.turn_count, status.duration_minutes
            )?;
            writeln!(
                out,
                "Mood:     {}",
                status.current_mood.as_deref().unwrap_or("(none yet)")
            )?;
            if status.active_topics.is_empty() {
                writeln!(out, "Topics:   (none yet)")?;
            } else {
                writeln!(out, "Topics:   {}", status.active_topics.join(", "))?;
            }
        }
        Command::Tone(None) => {
            let all: Vec<&str> = ToneStyle::ALL.iter().map(|t| t.label()).collect();
            writeln!(out, "Current tone: {}", session.tone())?;
            writeln!(out, "Available: {}", all.join(", "))?;
        }
        Command::Tone(Some(name)) => match name.parse::<ToneStyle>() {
            Ok(tone) => {
                session.set_tone(tone);
                writeln!(out, "Tone set to {}.", tone)?;
            }
            Err(e) => writeln!(out, "{}", e)?,
        },
        Command::Export(None) => writeln!(out, "Usage: /export <path>")?,
        Command::Export(Some(path)) => match std::fs::write(&path, session.transcript()) {
            Ok(()) => writeln!(out, "Transcript saved to {}.", path)?,
            Err(e) => {
                tracing::warn!("Transcript export to {} failed: {}", path, e);
                writeln!(out, "Could not save transcript: {}", e)?;
            }
        },
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Unknown(name) => writeln!(out, "Unknown command '/{}'. Try /help.", name)?,
    }
    Ok(())
}
