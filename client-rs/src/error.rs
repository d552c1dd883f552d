//! Error types for the messaging session

use thiserror::Error;

/// Error reported by the messaging client, carrying its numeric code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("RTM error {code}: {message}")]
pub struct RtmError {
    pub code: i32,
    pub message: String,
}

impl RtmError {
    /// The app does not have the messaging service enabled
    pub const SERVICE_NOT_ENABLED: i32 = -10015;

    /// The app has a certificate, so login needs a token
    pub const TOKEN_REQUIRED: i32 = -10005;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors that can occur when using a messaging session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No application id to create a client with
    #[error("Messaging app ID is not configured")]
    NotConfigured,

    #[error("Already logged in as {0}. Log out first.")]
    AlreadyLoggedIn(String),

    /// The operation needs a logged-in session; names the operation
    #[error("Must be logged in to {0}")]
    NotLoggedIn(&'static str),

    #[error("Already in channel {0}. Leave current channel first.")]
    AlreadyInChannel(String),

    #[error("Must be in a channel to send channel messages")]
    NotInChannel,

    #[error(
        "Messaging service is not enabled. Enable it for this project in the platform console."
    )]
    ServiceNotEnabled,

    #[error(
        "Token authentication required. The project has an app certificate enabled; \
         provide a valid token or disable the certificate."
    )]
    TokenRequired,

    /// Any other client failure, passed through unchanged
    #[error(transparent)]
    Client(#[from] RtmError),
}

impl SessionError {
    /// Translate a login failure, turning the two well-known codes into guidance
    pub fn from_login(err: RtmError) -> Self {
        match err.code {
            RtmError::SERVICE_NOT_ENABLED => SessionError::ServiceNotEnabled,
            RtmError::TOKEN_REQUIRED => SessionError::TokenRequired,
            _ => SessionError::Client(err),
        }
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtm_error_display() {
        let err = RtmError::new(-2, "peer offline");
        assert_eq!(err.to_string(), "RTM error -2: peer offline");
    }

    #[test]
    fn test_login_translation() {
        assert_eq!(
            SessionError::from_login(RtmError::new(RtmError::SERVICE_NOT_ENABLED, "x")),
            SessionError::ServiceNotEnabled
        );
        assert_eq!(
            SessionError::from_login(RtmError::new(RtmError::TOKEN_REQUIRED, "x")),
            SessionError::TokenRequired
        );

        let other = RtmError::new(-10001, "timeout");
        assert_eq!(
            SessionError::from_login(other.clone()),
            SessionError::Client(other)
        );
    }

    #[test]
    fn test_passthrough_keeps_message() {
        let err: SessionError = RtmError::new(-7, "boom").into();
        assert_eq!(err.to_string(), "RTM error -7: boom");
    }

    #[test]
    fn test_guidance_text() {
        assert!(SessionError::TokenRequired.to_string().contains("token"));
        assert!(SessionError::ServiceNotEnabled.to_string().contains("not enabled"));
        assert_eq!(
            SessionError::NotLoggedIn("join a channel").to_string(),
            "Must be logged in to join a channel"
        );
    }
}
