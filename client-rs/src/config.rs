//! Configuration for messaging sessions

use tracing::warn;

/// Environment variable holding the real-time application id
pub const APP_ID_ENV: &str = "HUDDLE_APP_ID";

/// Configuration for creating messaging clients
#[derive(Debug, Clone, Default)]
pub struct RtmConfig {
    /// Application id the client is created for
    pub app_id: String,

    /// Allow string user ids instead of numeric ones only
    pub string_user_ids: bool,
}

impl RtmConfig {
    /// Create a new configuration for the given application id
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            string_user_ids: true,
        }
    }

    /// Read the application id from `HUDDLE_APP_ID`
    ///
    /// A missing id is not an error here; logins fail until one is set.
    pub fn from_env() -> Self {
        let app_id = std::env::var(APP_ID_ENV).unwrap_or_default();
        if app_id.is_empty() {
            warn!("{} is not set, messaging logins will fail", APP_ID_ENV);
        }
        Self::new(app_id)
    }

    /// Restrict user ids to numbers
    pub fn numeric_user_ids(mut self) -> Self {
        self.string_user_ids = false;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.app_id.is_empty()
    }
}
