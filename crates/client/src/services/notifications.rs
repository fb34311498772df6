//! Notification endpoints

use std::sync::Arc;

use murmur_domain::types::common::{PageQuery, Paginated};
use murmur_domain::types::message::UnreadCount;
use murmur_domain::types::notification::Notification;
use murmur_domain::ApiResult;
use uuid::Uuid;

use crate::http::ApiClient;

/// `/notifications/*` endpoints
pub struct NotificationsService {
    client: Arc<ApiClient>,
}

impl NotificationsService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// The authenticated user's notifications, paginated
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](murmur_domain::ApiError).
    pub async fn list(&self, page: PageQuery) -> ApiResult<Paginated<Notification>> {
        self.client.get_with_query("/notifications", page.to_pairs()).await
    }

    /// Count of unread notifications
    pub async fn unread_count(&self) -> ApiResult<UnreadCount> {
        self.client.get("/notifications/unread-count").await
    }

    /// Mark one notification as read
    pub async fn mark_read(&self, notification_id: Uuid) -> ApiResult<()> {
        self.client.put_empty_unit(&format!("/notifications/{notification_id}/read")).await
    }

    /// Mark every notification as read
    pub async fn mark_all_read(&self) -> ApiResult<()> {
        self.client.put_empty_unit("/notifications/read-all").await
    }

    /// Delete a notification
    pub async fn delete(&self, notification_id: Uuid) -> ApiResult<()> {
        self.client.delete_unit(&format!("/notifications/{notification_id}")).await
    }
}
