//! Messaging client capability set
//!
//! A session drives whatever implements these traits: a binding to a hosted
//! messaging service, or the in-process [`MemoryHub`](crate::MemoryHub).
//! Events are pushed to registered handlers at arbitrary times, on whatever
//! task the client delivers them from.

use crate::config::RtmConfig;
use crate::error::RtmError;
use crate::messages::{RtmEvent, TextMessage};
use async_trait::async_trait;
use std::sync::Arc;

/// Handler for client events
pub type EventHandler = Arc<dyn Fn(&RtmEvent) + Send + Sync>;

/// Creates messaging clients
pub trait RtmConnector: Send + Sync {
    /// Create a client for `uid` under the configured application
    fn create_client(
        &self,
        config: &RtmConfig,
        uid: &str,
    ) -> Result<Box<dyn RtmClient>, RtmError>;
}

/// A client bound to one user id
#[async_trait]
pub trait RtmClient: Send + Sync {
    /// Log in, with a token when the application requires one
    async fn login(&self, token: Option<&str>) -> Result<(), RtmError>;

    async fn logout(&self) -> Result<(), RtmError>;

    /// Channel handle; nothing happens on the service until `join`
    fn create_channel(&self, name: &str) -> Result<Box<dyn RtmChannel>, RtmError>;

    async fn send_message_to_peer(
        &self,
        message: TextMessage,
        peer_id: &str,
    ) -> Result<(), RtmError>;

    /// Register a handler for peer messages
    fn on_event(&self, handler: EventHandler);

    fn remove_all_listeners(&self);
}

/// A channel created by a client
#[async_trait]
pub trait RtmChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn join(&self) -> Result<(), RtmError>;

    async fn leave(&self) -> Result<(), RtmError>;

    /// Send to every other member
    async fn send_message(&self, message: TextMessage) -> Result<(), RtmError>;

    /// Register a handler for channel messages and membership changes
    fn on_event(&self, handler: EventHandler);
}
