//! In-process messaging hub
//!
//! Implements the client capability set for any number of users sharing one
//! process. Deliveries happen inline on the sender's task, in send order.

use crate::client::{EventHandler, RtmChannel, RtmClient, RtmConnector};
use crate::config::RtmConfig;
use crate::error::RtmError;
use crate::messages::{RtmEvent, TextMessage};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Operation needs a logged-in client
pub const NOT_LOGGED_IN: i32 = -1;
/// Peer message target is not logged in
pub const PEER_OFFLINE: i32 = -2;
/// Channel operation by a non-member
pub const NOT_MEMBER: i32 = -3;
/// User id rejected by the client options
pub const INVALID_USER_ID: i32 = -4;

/// Decides whether `uid` may log in with `token`
pub type TokenCheck = Arc<dyn Fn(&str, Option<&str>) -> Result<(), RtmError> + Send + Sync>;

#[derive(Default)]
struct Listeners {
    handlers: Mutex<Vec<EventHandler>>,
}

impl Listeners {
    fn add(&self, handler: EventHandler) {
        self.handlers.lock().push(handler);
    }

    fn clear(&self) {
        self.handlers.lock().clear();
    }

    fn emit(&self, event: &RtmEvent) {
        let handlers = self.handlers.lock().clone();
        for handler in handlers {
            handler(event);
        }
    }
}

struct HubInner {
    rtm_enabled: bool,
    token_check: Option<TokenCheck>,
    /// Logged-in users and their client listeners
    online: DashMap<String, Arc<Listeners>>,
    /// Channel name -> member uid -> that member's channel listeners
    channels: DashMap<String, DashMap<String, Arc<Listeners>>>,
}

impl HubInner {
    fn broadcast(&self, channel: &str, except: &str, event: &RtmEvent) {
        let targets: Vec<Arc<Listeners>> = match self.channels.get(channel) {
            Some(members) => members
                .iter()
                .filter(|m| m.key() != except)
                .map(|m| Arc::clone(m.value()))
                .collect(),
            None => return,
        };

        for listeners in targets {
            listeners.emit(event);
        }
    }

    fn remove_member(&self, channel: &str, uid: &str) -> bool {
        let removed = self
            .channels
            .get(channel)
            .map_or(false, |members| members.remove(uid).is_some());

        if removed {
            self.channels.remove_if(channel, |_, members| members.is_empty());
            let event = RtmEvent::MemberLeft {
                member_id: uid.to_string(),
            };
            self.broadcast(channel, uid, &event);
        }
        removed
    }
}

/// Shared in-memory messaging service
#[derive(Clone)]
pub struct MemoryHub {
    inner: Arc<HubInner>,
}

impl Default for MemoryHub {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHub {
    /// Hub with messaging enabled and no token requirement
    pub fn new() -> Self {
        Self::build(true, None)
    }

    /// Hub whose logins fail with [`RtmError::SERVICE_NOT_ENABLED`]
    pub fn disabled() -> Self {
        Self::build(false, None)
    }

    /// Hub that runs `check` on every login
    ///
    /// Logins without a token fail with [`RtmError::TOKEN_REQUIRED`] before
    /// `check` is consulted.
    pub fn with_token_check<F>(check: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> Result<(), RtmError> + Send + Sync + 'static,
    {
        Self::build(true, Some(Arc::new(check)))
    }

    fn build(rtm_enabled: bool, token_check: Option<TokenCheck>) -> Self {
        Self {
            inner: Arc::new(HubInner {
                rtm_enabled,
                token_check,
                online: DashMap::new(),
                channels: DashMap::new(),
            }),
        }
    }

    pub fn is_online(&self, uid: &str) -> bool {
        self.inner.online.contains_key(uid)
    }

    /// Current members of `channel`, sorted
    pub fn channel_members(&self, channel: &str) -> Vec<String> {
        let mut members: Vec<String> = self
            .inner
            .channels
            .get(channel)
            .map(|m| m.iter().map(|e| e.key().clone()).collect())
            .unwrap_or_default();
        members.sort();
        members
    }
}

impl RtmConnector for MemoryHub {
    fn create_client(
        &self,
        config: &RtmConfig,
        uid: &str,
    ) -> Result<Box<dyn RtmClient>, RtmError> {
        if uid.is_empty() || (!config.string_user_ids && uid.parse::<u32>().is_err()) {
            return Err(RtmError::new(
                INVALID_USER_ID,
                format!("invalid user id '{}'", uid),
            ));
        }

        Ok(Box::new(MemoryClient {
            hub: Arc::clone(&self.inner),
            uid: uid.to_string(),
            listeners: Arc::new(Listeners::default()),
        }))
    }
}

struct MemoryClient {
    hub: Arc<HubInner>,
    uid: String,
    listeners: Arc<Listeners>,
}

impl MemoryClient {
    fn is_logged_in(&self) -> bool {
        self.hub
            .online
            .get(&self.uid)
            .map_or(false, |l| Arc::ptr_eq(l.value(), &self.listeners))
    }
}

#[async_trait]
impl RtmClient for MemoryClient {
    async fn login(&self, token: Option<&str>) -> Result<(), RtmError> {
        if !self.hub.rtm_enabled {
            return Err(RtmError::new(
                RtmError::SERVICE_NOT_ENABLED,
                "messaging service not enabled",
            ));
        }

        if let Some(check) = &self.hub.token_check {
            if token.is_none() {
                return Err(RtmError::new(RtmError::TOKEN_REQUIRED, "token required"));
            }
            check(&self.uid, token)?;
        }

        self.hub
            .online
            .insert(self.uid.clone(), Arc::clone(&self.listeners));
        debug!(uid = %self.uid, "Hub login");
        Ok(())
    }

    async fn logout(&self) -> Result<(), RtmError> {
        if !self.is_logged_in() {
            return Err(RtmError::new(NOT_LOGGED_IN, "not logged in"));
        }

        let joined: Vec<String> = self
            .hub
            .channels
            .iter()
            .filter(|c| c.value().contains_key(&self.uid))
            .map(|c| c.key().clone())
            .collect();
        for channel in joined {
            self.hub.remove_member(&channel, &self.uid);
        }

        self.hub.online.remove(&self.uid);
        debug!(uid = %self.uid, "Hub logout");
        Ok(())
    }

    fn create_channel(&self, name: &str) -> Result<Box<dyn RtmChannel>, RtmError> {
        Ok(Box::new(MemoryChannel {
            hub: Arc::clone(&self.hub),
            name: name.to_string(),
            uid: self.uid.clone(),
            client_listeners: Arc::clone(&self.listeners),
            listeners: Arc::new(Listeners::default()),
        }))
    }

    async fn send_message_to_peer(
        &self,
        message: TextMessage,
        peer_id: &str,
    ) -> Result<(), RtmError> {
        if !self.is_logged_in() {
            return Err(RtmError::new(NOT_LOGGED_IN, "not logged in"));
        }

        let peer = self
            .hub
            .online
            .get(peer_id)
            .map(|l| Arc::clone(l.value()))
            .ok_or_else(|| RtmError::new(PEER_OFFLINE, format!("peer {} is offline", peer_id)))?;

        peer.emit(&RtmEvent::PeerMessage {
            peer_id: self.uid.clone(),
            message,
        });
        Ok(())
    }

    fn on_event(&self, handler: EventHandler) {
        self.listeners.add(handler);
    }

    fn remove_all_listeners(&self) {
        self.listeners.clear();
    }
}

struct MemoryChannel {
    hub: Arc<HubInner>,
    name: String,
    uid: String,
    /// Listeners of the owning client, used to check it is still logged in
    client_listeners: Arc<Listeners>,
    listeners: Arc<Listeners>,
}

impl MemoryChannel {
    fn is_member(&self) -> bool {
        self.hub
            .channels
            .get(&self.name)
            .map_or(false, |m| m.contains_key(&self.uid))
    }

    fn owner_logged_in(&self) -> bool {
        self.hub
            .online
            .get(&self.uid)
            .map_or(false, |l| Arc::ptr_eq(l.value(), &self.client_listeners))
    }
}

#[async_trait]
impl RtmChannel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn join(&self) -> Result<(), RtmError> {
        if !self.owner_logged_in() {
            return Err(RtmError::new(NOT_LOGGED_IN, "not logged in"));
        }

        self.hub
            .channels
            .entry(self.name.clone())
            .or_default()
            .insert(self.uid.clone(), Arc::clone(&self.listeners));

        let event = RtmEvent::MemberJoined {
            member_id: self.uid.clone(),
        };
        self.hub.broadcast(&self.name, &self.uid, &event);
        debug!(uid = %self.uid, channel = %self.name, "Hub join");
        Ok(())
    }

    async fn leave(&self) -> Result<(), RtmError> {
        if !self.hub.remove_member(&self.name, &self.uid) {
            return Err(RtmError::new(NOT_MEMBER, format!("not in channel {}", self.name)));
        }
        debug!(uid = %self.uid, channel = %self.name, "Hub leave");
        Ok(())
    }

    async fn send_message(&self, message: TextMessage) -> Result<(), RtmError> {
        if !self.is_member() {
            return Err(RtmError::new(NOT_MEMBER, format!("not in channel {}", self.name)));
        }

        let event = RtmEvent::ChannelMessage {
            member_id: self.uid.clone(),
            message,
        };
        self.hub.broadcast(&self.name, &self.uid, &event);
        Ok(())
    }

    fn on_event(&self, handler: EventHandler) {
        self.listeners.add(handler);
    }
}
