//! Direct-messaging endpoints
//!
//! Plain REST: conversation listings, history pages, sends and read
//! receipts. Nothing here is cached; conversation state goes stale too
//! fast to be worth the invalidation traffic.

use std::sync::Arc;

use murmur_domain::types::common::{PageQuery, Paginated};
use murmur_domain::types::message::{Conversation, Message, SendMessage, UnreadCount};
use murmur_domain::ApiResult;
use uuid::Uuid;

use crate::http::ApiClient;

/// `/messages/*` endpoints
pub struct MessagesService {
    client: Arc<ApiClient>,
}

impl MessagesService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// The authenticated user's conversations, paginated
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](murmur_domain::ApiError).
    pub async fn conversations(&self, page: PageQuery) -> ApiResult<Paginated<Conversation>> {
        self.client.get_with_query("/messages/conversations", page.to_pairs()).await
    }

    /// Message history for a conversation, paginated newest-first
    pub async fn messages(
        &self,
        conversation_id: Uuid,
        page: PageQuery,
    ) -> ApiResult<Paginated<Message>> {
        self.client
            .get_with_query(&format!("/messages/conversations/{conversation_id}"), page.to_pairs())
            .await
    }

    /// Send a message
    pub async fn send(&self, message: &SendMessage) -> ApiResult<Message> {
        self.client.post("/messages", message).await
    }

    /// Mark a conversation as read
    pub async fn mark_read(&self, conversation_id: Uuid) -> ApiResult<()> {
        self.client.put_empty_unit(&format!("/messages/conversations/{conversation_id}/read")).await
    }

    /// Total unread messages across conversations
    pub async fn unread_count(&self) -> ApiResult<UnreadCount> {
        self.client.get("/messages/unread-count").await
    }
}
