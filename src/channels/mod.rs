//! Channel naming
//!
//! A channel is a flat name shared by everyone who joins it: `10000`,
//! `weekly standup`, `team:design`. Names follow the real-time platform rules:
//! - non-empty, at most 64 bytes
//! - ASCII letters, digits, space, and ``!#$%&()+-:;<=.>?@[]^_{}|~,``

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Maximum channel name length in bytes
pub const MAX_CHANNEL_LEN: usize = 64;

const PUNCTUATION: &str = "!#$%&()+-:;<=.>?@[]^_{}|~, ";

fn is_valid_channel_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || PUNCTUATION.contains(c)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("channel name cannot be empty")]
    Empty,

    #[error("channel name is {0} bytes, the limit is {max}", max = MAX_CHANNEL_LEN)]
    TooLong(usize),

    #[error("invalid character {0:?} in channel name")]
    InvalidChar(char),
}

/// A validated channel name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    name: String,
}

impl Channel {
    /// Parse and validate a channel name
    pub fn parse(name: &str) -> Result<Self, ChannelError> {
        if name.is_empty() {
            return Err(ChannelError::Empty);
        }

        if name.len() > MAX_CHANNEL_LEN {
            return Err(ChannelError::TooLong(name.len()));
        }

        if let Some(bad) = name.chars().find(|c| !is_valid_channel_char(*c)) {
            return Err(ChannelError::InvalidChar(bad));
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Channel::parse(&s).map_err(serde::de::Error::custom)
    }
}
