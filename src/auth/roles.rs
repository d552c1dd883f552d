//! Channel roles and the privileges they carry

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role '{0}': must be publisher or subscriber")]
pub struct InvalidRole(pub String);

/// What a subject is allowed to do in a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    /// Enter the channel
    JoinChannel,
    /// Send an audio stream
    PublishAudio,
    /// Send a video stream
    PublishVideo,
    /// Send data stream messages
    PublishData,
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privilege::JoinChannel => write!(f, "join_channel"),
            Privilege::PublishAudio => write!(f, "publish_audio"),
            Privilege::PublishVideo => write!(f, "publish_video"),
            Privilege::PublishData => write!(f, "publish_data"),
        }
    }
}

/// Role a token grants in its channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Joins and publishes media
    #[default]
    Publisher,
    /// Joins and only receives
    Subscriber,
}

impl Role {
    /// Privileges implied by this role
    pub fn privileges(&self) -> &'static [Privilege] {
        match self {
            Role::Publisher => &[
                Privilege::JoinChannel,
                Privilege::PublishAudio,
                Privilege::PublishVideo,
                Privilege::PublishData,
            ],
            Role::Subscriber => &[Privilege::JoinChannel],
        }
    }

    pub fn allows(&self, privilege: Privilege) -> bool {
        self.privileges().contains(&privilege)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Publisher => "publisher",
            Role::Subscriber => "subscriber",
        }
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "publisher" => Ok(Role::Publisher),
            "subscriber" => Ok(Role::Subscriber),
            _ => Err(InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("publisher".parse::<Role>(), Ok(Role::Publisher));
        assert_eq!("Subscriber".parse::<Role>(), Ok(Role::Subscriber));
        assert_eq!(
            "admin".parse::<Role>(),
            Err(InvalidRole("admin".to_string()))
        );
    }

    #[test]
    fn test_role_default_is_publisher() {
        assert_eq!(Role::default(), Role::Publisher);
    }

    #[test]
    fn test_role_privileges() {
        assert!(Role::Publisher.allows(Privilege::PublishVideo));
        assert!(Role::Publisher.allows(Privilege::JoinChannel));

        assert!(Role::Subscriber.allows(Privilege::JoinChannel));
        assert!(!Role::Subscriber.allows(Privilege::PublishAudio));
        assert!(!Role::Subscriber.allows(Privilege::PublishData));
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Subscriber).unwrap(),
            "\"subscriber\""
        );
        let role: Role = serde_json::from_str("\"publisher\"").unwrap();
        assert_eq!(role, Role::Publisher);
    }
}
