//! Transcript rendering.
//!
//! The renderer only reads the session. It remembers how much of the log it
//! has already printed and the last status it announced.

use std::io::{self, Write};

use crate::{
    domain::{ChatEvent, EventType, ProtocolClient, SessionStatus},
    usecase::{ChatSession, Notice},
};

const MISSING_TIMESTAMP: &str = "--:--:--";

/// One transcript line for an event.
pub fn format_event(event: &ChatEvent) -> String {
    if !event.is_system() {
        let timestamp = event
            .timestamp()
            .map_or(MISSING_TIMESTAMP, |t| t.as_str());
        return format!("[{timestamp}] {}: {}", event.sender(), event.content());
    }
    if !event.content().is_empty() {
        return format!("* {}", event.content());
    }
    match event.event_type() {
        EventType::Leave => format!("* {} left", event.sender()),
        _ => format!("* {} joined", event.sender()),
    }
}

pub fn format_notice(notice: &Notice) -> String {
    format!("!!! {notice}")
}

pub struct Renderer<W: Write> {
    out: W,
    rendered: usize,
    status: SessionStatus,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rendered: 0,
            status: SessionStatus::Disconnected,
        }
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn welcome(&mut self) -> io::Result<()> {
        self.line("Welcome to Agora. Enter a username to join the public room.")?;
        self.line("Commands: /leave to leave the room, /quit to exit.")
    }

    /// Print notices, status changes and log entries added since the last call.
    pub fn sync<C: ProtocolClient>(&mut self, session: &mut ChatSession<C>) -> io::Result<()> {
        for notice in session.take_notices() {
            writeln!(self.out, "{}", format_notice(&notice))?;
        }

        if session.status() != self.status {
            self.status = session.status();
            let text = match (self.status, session.username()) {
                (SessionStatus::Connecting, _) => "*** connecting...".to_string(),
                (SessionStatus::Connected, Some(username)) => {
                    format!("*** connected as {username}")
                }
                (SessionStatus::Connected, None) => "*** connected".to_string(),
                (SessionStatus::Disconnected, _) => {
                    "*** disconnected. Enter a username to join again.".to_string()
                }
            };
            writeln!(self.out, "{text}")?;
        }

        // The log only shrinks when it is cleared.
        let log = session.log();
        if log.len() < self.rendered {
            self.rendered = 0;
        }
        for event in &log.as_slice()[self.rendered..] {
            writeln!(self.out, "{}", format_event(event))?;
        }
        self.rendered = log.len();

        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
