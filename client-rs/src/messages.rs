//! Message and event types
//!
//! `TextMessage` and `RtmEvent` are what the messaging client hands over;
//! `ChatMessage` is the entry kept in a local chat history.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Plain text message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Events emitted by the messaging client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RtmEvent {
    /// Direct message from another user
    PeerMessage { peer_id: String, message: TextMessage },

    /// Message sent to the joined channel by another member
    ChannelMessage { member_id: String, message: TextMessage },

    /// Another member joined the channel
    MemberJoined { member_id: String },

    /// Another member left the channel
    MemberLeft { member_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Peer,
    Channel,
}

/// One entry in the chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `<timestamp>-<uid>`
    pub id: String,
    pub text: String,
    /// Sender
    pub uid: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub kind: MessageKind,
}

impl ChatMessage {
    /// Message stamped with the current time
    pub fn new(kind: MessageKind, uid: impl Into<String>, text: impl Into<String>) -> Self {
        Self::at(Utc::now().timestamp_millis(), kind, uid, text)
    }

    pub fn at(
        timestamp: i64,
        kind: MessageKind,
        uid: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let uid = uid.into();
        Self {
            id: format!("{}-{}", timestamp, uid),
            text: text.into(),
            uid,
            timestamp,
            kind,
        }
    }

    /// History entry for an inbound message event; `None` for membership events
    pub fn from_event(event: &RtmEvent) -> Option<Self> {
        match event {
            RtmEvent::PeerMessage { peer_id, message } => {
                Some(Self::new(MessageKind::Peer, peer_id.as_str(), message.text.as_str()))
            }
            RtmEvent::ChannelMessage { member_id, message } => Some(Self::new(
                MessageKind::Channel,
                member_id.as_str(),
                message.text.as_str(),
            )),
            RtmEvent::MemberJoined { .. } | RtmEvent::MemberLeft { .. } => None,
        }
    }
}
