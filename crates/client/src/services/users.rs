//! User profile and social-graph endpoints

use std::sync::Arc;

use murmur_domain::types::common::{PageQuery, Paginated};
use murmur_domain::types::user::{
    AvatarPayload, FollowingStatus, ProfileUpdate, User, UserProfile,
};
use murmur_domain::ApiResult;
use uuid::Uuid;

use super::{cached_fetch, ResponseCache};
use crate::http::{ApiClient, FilePart, ProgressHandler};

/// `/users/*` endpoints
pub struct UsersService {
    client: Arc<ApiClient>,
    cache: Arc<ResponseCache>,
}

impl UsersService {
    pub fn new(client: Arc<ApiClient>, cache: Arc<ResponseCache>) -> Self {
        Self { client, cache }
    }

    /// A user's profile by username, cached
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](murmur_domain::ApiError); an
    /// unknown username surfaces as a 404 `Client` error.
    pub async fn get(&self, username: &str) -> ApiResult<UserProfile> {
        let key = format!("users:{username}");
        let path = format!("/users/{username}");
        cached_fetch(&self.cache, &key, || async move { self.client.get(&path).await }).await
    }

    /// The authenticated user's profile, cached
    pub async fn current(&self) -> ApiResult<UserProfile> {
        cached_fetch(&self.cache, "users:me", || self.client.get("/users/me")).await
    }

    /// Update the authenticated user's profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        let profile: UserProfile = self.client.put("/users/me", update).await?;
        self.cache.invalidate("users:");
        Ok(profile)
    }

    /// Upload a new avatar image
    ///
    /// `progress`, when given, receives the upload percentage.
    pub async fn upload_avatar(
        &self,
        file: FilePart,
        progress: Option<ProgressHandler>,
    ) -> ApiResult<AvatarPayload> {
        let payload: AvatarPayload =
            self.client.upload("/users/me/avatar", file, progress).await?;
        self.cache.invalidate("users:");
        Ok(payload)
    }

    /// Follow a user
    pub async fn follow(&self, user_id: Uuid) -> ApiResult<()> {
        self.client.post_empty_unit(&format!("/users/{user_id}/follow")).await?;
        self.cache.invalidate("users:");
        Ok(())
    }

    /// Unfollow a user
    pub async fn unfollow(&self, user_id: Uuid) -> ApiResult<()> {
        self.client.delete_unit(&format!("/users/{user_id}/follow")).await?;
        self.cache.invalidate("users:");
        Ok(())
    }

    /// Whether the authenticated user follows the given user
    pub async fn following_status(&self, user_id: Uuid) -> ApiResult<FollowingStatus> {
        self.client.get(&format!("/users/{user_id}/following-status")).await
    }

    /// A user's followers, paginated
    pub async fn followers(&self, user_id: Uuid, page: PageQuery) -> ApiResult<Paginated<User>> {
        self.client.get_with_query(&format!("/users/{user_id}/followers"), page.to_pairs()).await
    }

    /// Users the given user follows, paginated
    pub async fn following(&self, user_id: Uuid, page: PageQuery) -> ApiResult<Paginated<User>> {
        self.client.get_with_query(&format!("/users/{user_id}/following"), page.to_pairs()).await
    }

    /// Search users by name or handle
    pub async fn search(&self, query: &str, page: PageQuery) -> ApiResult<Paginated<User>> {
        let mut pairs = vec![("q".to_string(), query.to_string())];
        pairs.extend(page.to_pairs());
        self.client.get_with_query("/users/search", pairs).await
    }
}
