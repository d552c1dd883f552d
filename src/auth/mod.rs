//! Channel access tokens
//!
//! A token grants one subject a role in one channel until an expiry time. It
//! is signed with the application certificate shared with the real-time
//! platform, so the platform can check it without calling back.
//!
//! Roles:
//! - `publisher`: join and publish audio, video and data
//! - `subscriber`: join and receive only

mod issue;
mod roles;
mod tokens;

pub use issue::{
    issue, now_secs, Credential, RequestError, TokenQuery, TokenRequest, DEFAULT_LIFETIME_SECS,
};
pub use roles::{InvalidRole, Privilege, Role};
pub use tokens::{AccessToken, AppCertificate, Subject, TokenClaims, TokenError, TOKEN_PREFIX};
