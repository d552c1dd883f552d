//! Chat history on top of a messaging session

use crate::error::Result;
use crate::messages::{ChatMessage, MessageKind, RtmEvent};
use crate::session::{RtmSession, SessionState, Subscription};

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// A session plus the message history and last error a chat view shows
///
/// Inbound peer and channel messages are appended as they arrive; sent
/// messages are appended once the send succeeds.
pub struct RtmChat {
    session: RtmSession,
    history: Arc<Mutex<Vec<ChatMessage>>>,
    last_error: Option<String>,
    subscription: Option<Subscription>,
}

impl RtmChat {
    pub fn new(session: RtmSession) -> Self {
        let history = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&history);
        let subscription = session.subscribe(move |event| {
            match event {
                RtmEvent::MemberJoined { member_id } => {
                    info!(member_id = %member_id, "Member joined");
                }
                RtmEvent::MemberLeft { member_id } => {
                    info!(member_id = %member_id, "Member left");
                }
                _ => {}
            }

            if let Some(message) = ChatMessage::from_event(event) {
                sink.lock().push(message);
            }
        });

        Self {
            session,
            history,
            last_error: None,
            subscription: Some(subscription),
        }
    }

    pub fn session(&self) -> &RtmSession {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Snapshot of the history, oldest first
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.history.lock().clone()
    }

    pub fn clear_messages(&self) {
        self.history.lock().clear();
    }

    /// Text of the most recent failure, cleared when the next operation starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
        }
        result
    }

    pub async fn login(&mut self, uid: &str, token: Option<&str>) -> Result<()> {
        self.last_error = None;
        let result = self.session.login(uid, token).await;
        self.track(result)
    }

    /// Log out and drop the history
    pub async fn logout(&mut self) -> Result<()> {
        self.last_error = None;
        let result = self.session.logout().await;
        self.clear_messages();
        self.track(result)
    }

    pub async fn join_channel(&mut self, name: &str) -> Result<()> {
        self.last_error = None;
        let result = self.session.join_channel(name).await;
        self.track(result)
    }

    pub async fn leave_channel(&mut self) -> Result<()> {
        self.last_error = None;
        let result = self.session.leave_channel().await;
        self.track(result)
    }

    pub async fn send_peer_message(&mut self, peer_id: &str, text: &str) -> Result<()> {
        self.last_error = None;
        let result = self.session.send_peer_message(peer_id, text).await;
        if result.is_ok() {
            self.echo(MessageKind::Peer, text);
        }
        self.track(result)
    }

    pub async fn send_channel_message(&mut self, text: &str) -> Result<()> {
        self.last_error = None;
        let result = self.session.send_channel_message(text).await;
        if result.is_ok() {
            self.echo(MessageKind::Channel, text);
        }
        self.track(result)
    }

    fn echo(&self, kind: MessageKind, text: &str) {
        let uid = self.session.current_uid().unwrap_or_default();
        self.history.lock().push(ChatMessage::new(kind, uid, text));
    }

    /// Stop recording, then shut the session down
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.last_error = None;
        let result = self.session.shutdown().await;
        self.track(result)
    }
}
