//! Value Objects for domain models.
//!
//! User input is trimmed before validation; lengths are counted in characters
//! so that non-ASCII names get the same budget as ASCII ones.

use std::fmt;

use super::error::ValueObjectError;

/// Maximum username length in characters
pub const USERNAME_MAX_CHARS: usize = 20;

/// Maximum message length in characters
pub const MESSAGE_MAX_CHARS: usize = 500;

/// Name the user joins the public channel with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a new Username from raw user input.
    ///
    /// # Arguments
    ///
    /// * `raw` - The username as typed; surrounding whitespace is dropped
    ///
    /// # Returns
    ///
    /// A Result containing the Username or an error if validation fails
    pub fn new(raw: &str) -> Result<Self, ValueObjectError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        let len = name.chars().count();
        if len > USERNAME_MAX_CHARS {
            return Err(ValueObjectError::UsernameTooLong {
                max: USERNAME_MAX_CHARS,
                actual: len,
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message content value object.
///
/// Represents the content of an outgoing chat message with validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Create a new MessageContent from raw user input.
    ///
    /// # Returns
    ///
    /// A Result containing the MessageContent or an error if validation fails
    pub fn new(raw: &str) -> Result<Self, ValueObjectError> {
        let content = raw.trim();
        if content.is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let len = content.chars().count();
        if len > MESSAGE_MAX_CHARS {
            return Err(ValueObjectError::MessageContentTooLong {
                max: MESSAGE_MAX_CHARS,
                actual: len,
            });
        }
        Ok(Self(content.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned timestamp, kept opaque (the broker formats it as "HH:MM:SS").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
