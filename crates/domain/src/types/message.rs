//! Direct-messaging shapes
//!
//! REST shapes only: conversations and messages are fetched and sent over
//! plain HTTP. The realtime delivery channel is out of scope for this SDK.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

/// Kind of message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    File,
    System,
}

/// Delivery state as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sending,
    Sent,
    Delivered,
    Read,
    Failed,
}

/// One-on-one or group conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
    pub participants: Vec<User>,
    pub last_message: Option<Message>,
    pub unread_count: u64,
    pub updated_at: DateTime<Utc>,
}

/// Conversation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    Direct,
    Group,
}

/// Message within a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: User,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    pub status: MessageStatus,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
}

/// Body for `POST /messages`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub conversation_id: Uuid,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

impl SendMessage {
    pub fn text(conversation_id: Uuid, content: impl Into<String>) -> Self {
        Self { conversation_id, content: content.into(), message_type: MessageType::Text }
    }
}

/// Payload of the unread-count endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}
