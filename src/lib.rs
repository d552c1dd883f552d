//! Huddle - meeting board backend with real-time channel tokens
//!
//! Mints signed, time-bounded tokens for joining real-time messaging
//! channels and serves the task/meeting board behind the team dashboard.

pub mod auth;
pub mod board;
pub mod channels;
pub mod config;
pub mod server;
pub mod storage;

pub use auth::{issue, AccessToken, AppCertificate, Credential, Role, Subject, TokenRequest};
pub use channels::Channel;
pub use config::AppCredentials;
pub use server::{create_router, AppState};
