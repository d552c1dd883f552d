//! Environment configuration

use crate::auth::AppCertificate;
use thiserror::Error;

/// Environment variable holding the real-time application id
pub const APP_ID_ENV: &str = "HUDDLE_APP_ID";
/// Environment variable holding the application signing certificate
pub const APP_CERTIFICATE_ENV: &str = "HUDDLE_APP_CERTIFICATE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Application identity used to sign channel tokens
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub certificate: AppCertificate,
}

impl AppCredentials {
    pub fn new(app_id: impl Into<String>, certificate: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            certificate: AppCertificate::new(certificate),
        }
    }

    /// Build from optional values, treating empty strings as unset
    pub fn from_parts(
        app_id: Option<String>,
        certificate: Option<String>,
    ) -> Result<Self, ConfigError> {
        let app_id = app_id
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(APP_ID_ENV))?;
        let certificate = certificate
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(APP_CERTIFICATE_ENV))?;

        Ok(Self::new(app_id, certificate))
    }

    /// Read `HUDDLE_APP_ID` and `HUDDLE_APP_CERTIFICATE`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(
            std::env::var(APP_ID_ENV).ok(),
            std::env::var(APP_CERTIFICATE_ENV).ok(),
        )
    }
}
