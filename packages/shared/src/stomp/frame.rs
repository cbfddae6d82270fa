//! STOMP frame model, encoder and decoder.

use std::{fmt, str::FromStr};

use super::error::FrameError;

/// A heart-beat on the wire: a bare end-of-line.
pub const HEARTBEAT: &str = "\n";

/// STOMP commands understood by this codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Message,
    Receipt,
    Error,
    Disconnect,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
            Command::Disconnect => "DISCONNECT",
        }
    }

    /// CONNECT and CONNECTED frames carry headers verbatim (no escaping).
    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

impl FromStr for Command {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Command::Connect),
            "STOMP" => Ok(Command::Stomp),
            "CONNECTED" => Ok(Command::Connected),
            "SEND" => Ok(Command::Send),
            "SUBSCRIBE" => Ok(Command::Subscribe),
            "UNSUBSCRIBE" => Ok(Command::Unsubscribe),
            "MESSAGE" => Ok(Command::Message),
            "RECEIPT" => Ok(Command::Receipt),
            "ERROR" => Ok(Command::Error),
            "DISCONNECT" => Ok(Command::Disconnect),
            other => Err(FrameError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single STOMP frame.
///
/// Headers keep their wire order; when a name repeats, the first occurrence
/// is the one [`Frame::header`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    headers: Vec<(String, String)>,
    pub body: String,
}

/// One decoded WebSocket message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    HeartBeat,
    Frame(Frame),
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Append a header (builder style).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace the body (builder style).
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of the named header, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Serialize to the wire representation, NUL-terminated.
    ///
    /// A `content-length` header is added for non-empty bodies unless the
    /// caller already set one.
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());

        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            push_header_part(&mut out, name, escape);
            out.push(':');
            push_header_part(&mut out, value, escape);
            out.push('\n');
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            out.push_str("content-length:");
            out.push_str(&self.body.len().to_string());
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parse one frame from its wire representation.
    ///
    /// Leading EOLs (heart-beats sent ahead of the frame) and trailing EOLs
    /// after the NUL are tolerated.
    pub fn decode(raw: &str) -> Result<Self, FrameError> {
        let raw = raw.trim_start_matches(['\r', '\n']);

        let (command_line, mut rest) = next_line(raw).ok_or(FrameError::Incomplete)?;
        let command = command_line.parse::<Command>()?;
        let unescape_values = command.escapes_headers();

        let mut headers = Vec::new();
        loop {
            let (line, remaining) = next_line(rest).ok_or(FrameError::Incomplete)?;
            rest = remaining;
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| FrameError::MalformedHeader(line.to_string()))?;
            if unescape_values {
                headers.push((unescape(name)?, unescape(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let content_length = headers
            .iter()
            .find(|(name, _)| name == "content-length")
            .map(|(_, value)| value.clone());

        let (body, after) = match content_length {
            Some(value) => {
                let length = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| FrameError::InvalidContentLength(value.clone()))?;
                let body = rest
                    .get(..length)
                    .ok_or_else(|| FrameError::InvalidContentLength(value.clone()))?;
                let after = rest
                    .get(length..)
                    .and_then(|tail| tail.strip_prefix('\0'))
                    .ok_or(FrameError::MissingNul)?;
                (body, after)
            }
            None => {
                let nul = rest.find('\0').ok_or(FrameError::MissingNul)?;
                (&rest[..nul], &rest[nul + 1..])
            }
        };

        if !after.chars().all(|c| c == '\n' || c == '\r') {
            return Err(FrameError::TrailingData);
        }

        Ok(Self {
            command,
            headers,
            body: body.to_string(),
        })
    }
}

/// Decode a WebSocket text message into either a heart-beat or a frame.
pub fn decode_message(raw: &str) -> Result<WireMessage, FrameError> {
    if raw.chars().all(|c| c == '\n' || c == '\r') {
        return Ok(WireMessage::HeartBeat);
    }
    Frame::decode(raw).map(WireMessage::Frame)
}

fn next_line(input: &str) -> Option<(&str, &str)> {
    let index = input.find('\n')?;
    let line = &input[..index];
    let line = line.strip_suffix('\r').unwrap_or(line);
    Some((line, &input[index + 1..]))
}

fn push_header_part(out: &mut String, part: &str, escape: bool) {
    if !escape {
        out.push_str(part);
        return;
    }
    for c in part.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
}

fn unescape(part: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(part.len());
    let mut chars = part.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::InvalidEscape(part.to_string())),
        }
    }
    Ok(out)
}
