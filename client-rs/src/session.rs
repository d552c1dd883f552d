//! Messaging session adapter
//!
//! Tracks one logged-in identity and at most one joined channel on top of an
//! [`RtmClient`], and re-emits the client's events to subscribers.

use crate::client::{EventHandler, RtmChannel, RtmClient, RtmConnector};
use crate::config::RtmConfig;
use crate::error::{Result, SessionError};
use crate::messages::{RtmEvent, TextMessage};

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
    /// Logged in with a joined channel
    InChannel,
}

#[derive(Default)]
struct Observers {
    handlers: Mutex<Vec<(Uuid, EventHandler)>>,
}

impl Observers {
    fn add(&self, handler: EventHandler) -> Uuid {
        let id = Uuid::new_v4();
        self.handlers.lock().push((id, handler));
        id
    }

    fn remove(&self, id: Uuid) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    fn dispatch(&self, event: &RtmEvent) {
        // Snapshot so handlers can subscribe or cancel while being called
        let handlers: Vec<EventHandler> =
            self.handlers.lock().iter().map(|(_, h)| h.clone()).collect();

        for handler in handlers {
            handler(event);
        }
    }

    fn forwarder(self: &Arc<Self>) -> EventHandler {
        let observers = Arc::clone(self);
        Arc::new(move |event| observers.dispatch(event))
    }
}

/// A registered event handler that can be cancelled
pub struct Subscription {
    id: Uuid,
    observers: Arc<Observers>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stop receiving events; returns false if already removed
    pub fn cancel(self) -> bool {
        self.observers.remove(self.id)
    }
}

/// Login, channel membership and messaging over an external client
///
/// The client is created lazily at the first login and reused for later
/// logins by the same user id.
pub struct RtmSession {
    config: RtmConfig,
    connector: Arc<dyn RtmConnector>,
    client: Option<Box<dyn RtmClient>>,
    /// User id the current client was created for
    client_uid: String,
    current_uid: Option<String>,
    channel: Option<Box<dyn RtmChannel>>,
    observers: Arc<Observers>,
}

impl RtmSession {
    pub fn new(config: RtmConfig, connector: Arc<dyn RtmConnector>) -> Self {
        Self {
            config,
            connector,
            client: None,
            client_uid: String::new(),
            current_uid: None,
            channel: None,
            observers: Arc::new(Observers::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.current_uid, &self.channel) {
            (None, _) => SessionState::LoggedOut,
            (Some(_), None) => SessionState::LoggedIn,
            (Some(_), Some(_)) => SessionState::InChannel,
        }
    }

    pub fn current_uid(&self) -> Option<&str> {
        self.current_uid.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_uid.is_some()
    }

    pub fn is_in_channel(&self) -> bool {
        self.channel.is_some()
    }

    pub fn channel_name(&self) -> Option<&str> {
        self.channel.as_ref().map(|c| c.name())
    }

    /// Register a handler for every event the client delivers
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&RtmEvent) + Send + Sync + 'static,
    {
        let id = self.observers.add(Arc::new(handler));
        Subscription {
            id,
            observers: Arc::clone(&self.observers),
        }
    }

    /// Log in as `uid`
    ///
    /// Fails if this session is already logged in; log out first to switch
    /// users.
    pub async fn login(&mut self, uid: &str, token: Option<&str>) -> Result<()> {
        if let Some(current) = &self.current_uid {
            return Err(SessionError::AlreadyLoggedIn(current.clone()));
        }

        let client = self.client_for(uid)?;
        if let Err(e) = client.login(token).await {
            warn!(uid = uid, code = e.code, error = %e.message, "Login failed");
            return Err(SessionError::from_login(e));
        }

        self.current_uid = Some(uid.to_string());
        info!(uid = uid, "Logged in");
        Ok(())
    }

    fn client_for(&mut self, uid: &str) -> Result<&dyn RtmClient> {
        if !self.config.is_configured() {
            return Err(SessionError::NotConfigured);
        }

        let reusable = self.client.is_some() && self.client_uid == uid;
        if !reusable {
            if let Some(old) = self.client.take() {
                debug!(old_uid = %self.client_uid, new_uid = uid, "Replacing client for new user");
                old.remove_all_listeners();
            }

            let client = self.connector.create_client(&self.config, uid)?;
            client.on_event(self.observers.forwarder());
            self.client_uid = uid.to_string();
            self.client = Some(client);
        }

        self.client
            .as_deref()
            .ok_or(SessionError::NotLoggedIn("log in"))
    }

    /// Log out, leaving the joined channel first
    ///
    /// Login state and channel membership are cleared even when the client
    /// reports an error; the first such error is returned.
    pub async fn logout(&mut self) -> Result<()> {
        let mut first_error = None;

        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.leave().await {
                warn!(channel = channel.name(), error = %e, "Leave during logout failed");
                first_error.get_or_insert(e);
            }
        }

        if let Some(uid) = self.current_uid.take() {
            if let Some(client) = &self.client {
                if let Err(e) = client.logout().await {
                    warn!(uid = %uid, error = %e, "Logout failed");
                    first_error.get_or_insert(e);
                }
            }
            info!(uid = %uid, "Logged out");
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Join `name`; only one channel can be joined at a time
    pub async fn join_channel(&mut self, name: &str) -> Result<()> {
        let client = match (&self.current_uid, &self.client) {
            (Some(_), Some(client)) => client,
            _ => return Err(SessionError::NotLoggedIn("join a channel")),
        };

        if let Some(channel) = &self.channel {
            return Err(SessionError::AlreadyInChannel(channel.name().to_string()));
        }

        let channel = client.create_channel(name)?;
        channel.on_event(self.observers.forwarder());
        if let Err(e) = channel.join().await {
            warn!(channel = name, error = %e, "Join channel failed");
            return Err(e.into());
        }

        info!(channel = name, "Joined channel");
        self.channel = Some(channel);
        Ok(())
    }

    /// Leave the joined channel; does nothing when no channel is joined
    pub async fn leave_channel(&mut self) -> Result<()> {
        if let Some(channel) = &self.channel {
            channel.leave().await?;
            info!(channel = channel.name(), "Left channel");
            self.channel = None;
        }
        Ok(())
    }

    pub async fn send_peer_message(&self, peer_id: &str, text: &str) -> Result<()> {
        let client = match (&self.current_uid, &self.client) {
            (Some(_), Some(client)) => client,
            _ => return Err(SessionError::NotLoggedIn("send messages")),
        };

        client
            .send_message_to_peer(TextMessage::new(text), peer_id)
            .await?;
        debug!(peer_id = peer_id, "Sent peer message");
        Ok(())
    }

    pub async fn send_channel_message(&self, text: &str) -> Result<()> {
        let channel = self.channel.as_ref().ok_or(SessionError::NotInChannel)?;

        channel.send_message(TextMessage::new(text)).await?;
        debug!(channel = channel.name(), "Sent channel message");
        Ok(())
    }

    /// Log out, then drop the client's listeners and the client itself
    pub async fn shutdown(&mut self) -> Result<()> {
        let result = self.logout().await;

        if let Some(client) = self.client.take() {
            client.remove_all_listeners();
            self.client_uid.clear();
        }

        result
    }
}
