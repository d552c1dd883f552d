//! Huddle real-time messaging session
//!
//! Wraps a messaging client (login, one joined channel, peer and channel
//! messages) behind a small state machine, and re-emits the client's events
//! to subscribers. [`MemoryHub`] provides an in-process client for tests and
//! local development.
//!
//! # Example
//!
//! ```
//! use huddle_rtm::{MemoryHub, RtmConfig, RtmSession, SessionState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = MemoryHub::new();
//!     let mut session = RtmSession::new(RtmConfig::new("my-app"), Arc::new(hub));
//!
//!     let _sub = session.subscribe(|event| {
//!         println!("event: {:?}", event);
//!     });
//!
//!     session.login("alex", None).await?;
//!     session.join_channel("standup").await?;
//!     session.send_channel_message("morning all").await?;
//!     assert_eq!(session.state(), SessionState::InChannel);
//!
//!     session.logout().await?;
//!     assert_eq!(session.state(), SessionState::LoggedOut);
//!     Ok(())
//! }
//! ```

mod chat;
mod client;
mod config;
mod error;
pub mod memory;
mod messages;
mod session;

pub use chat::RtmChat;
pub use client::{EventHandler, RtmChannel, RtmClient, RtmConnector};
pub use config::{RtmConfig, APP_ID_ENV};
pub use error::{Result, RtmError, SessionError};
pub use memory::MemoryHub;
pub use messages::{ChatMessage, MessageKind, RtmEvent, TextMessage};
pub use session::{RtmSession, SessionState, Subscription};
