//! Post and comment endpoints
//!
//! Reads are cached under the `posts:` prefix; every mutation invalidates
//! the whole prefix rather than chasing the exact keys a change can affect
//! (a liked post appears in the feed, the trending list and its own page).

use std::sync::Arc;

use murmur_domain::types::common::{PageQuery, Paginated};
use murmur_domain::types::post::{
    Comment, CreateComment, CreatePost, LikePayload, Post, UpdatePost,
};
use murmur_domain::ApiResult;
use uuid::Uuid;

use super::{cached_fetch, ResponseCache};
use crate::http::ApiClient;

/// `/posts/*` and `/comments/*` endpoints
pub struct PostsService {
    client: Arc<ApiClient>,
    cache: Arc<ResponseCache>,
}

impl PostsService {
    pub fn new(client: Arc<ApiClient>, cache: Arc<ResponseCache>) -> Self {
        Self { client, cache }
    }

    /// Home feed, cached per page
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](murmur_domain::ApiError).
    pub async fn feed(&self, page: PageQuery) -> ApiResult<Paginated<Post>> {
        let key = format!("posts:feed:{}:{}", page.page, page.limit);
        cached_fetch(&self.cache, &key, || {
            self.client.get_with_query("/posts", page.to_pairs())
        })
        .await
    }

    /// Trending posts, cached per page
    pub async fn trending(&self, page: PageQuery) -> ApiResult<Paginated<Post>> {
        let key = format!("posts:trending:{}:{}", page.page, page.limit);
        cached_fetch(&self.cache, &key, || {
            self.client.get_with_query("/posts/trending", page.to_pairs())
        })
        .await
    }

    /// A single post, cached by id
    pub async fn get(&self, post_id: Uuid) -> ApiResult<Post> {
        let key = format!("posts:{post_id}");
        let path = format!("/posts/{post_id}");
        cached_fetch(&self.cache, &key, || async move { self.client.get(&path).await }).await
    }

    /// Posts authored by a user (not cached; profile pages refetch)
    pub async fn by_user(&self, user_id: Uuid, page: PageQuery) -> ApiResult<Paginated<Post>> {
        self.client.get_with_query(&format!("/users/{user_id}/posts"), page.to_pairs()).await
    }

    /// Publish a post
    pub async fn create(&self, data: &CreatePost) -> ApiResult<Post> {
        let post: Post = self.client.post("/posts", data).await?;
        self.cache.invalidate("posts:");
        Ok(post)
    }

    /// Edit a post
    pub async fn update(&self, post_id: Uuid, data: &UpdatePost) -> ApiResult<Post> {
        let post: Post = self.client.put(&format!("/posts/{post_id}"), data).await?;
        self.cache.invalidate("posts:");
        Ok(post)
    }

    /// Delete a post
    pub async fn delete(&self, post_id: Uuid) -> ApiResult<()> {
        self.client.delete_unit(&format!("/posts/{post_id}")).await?;
        self.cache.invalidate("posts:");
        Ok(())
    }

    /// Like a post
    pub async fn like(&self, post_id: Uuid) -> ApiResult<LikePayload> {
        let payload: LikePayload =
            self.client.post_empty(&format!("/posts/{post_id}/like")).await?;
        self.cache.invalidate("posts:");
        Ok(payload)
    }

    /// Remove a like
    pub async fn unlike(&self, post_id: Uuid) -> ApiResult<LikePayload> {
        let payload: LikePayload = self.client.delete(&format!("/posts/{post_id}/like")).await?;
        self.cache.invalidate("posts:");
        Ok(payload)
    }

    /// Comments on a post
    pub async fn comments(&self, post_id: Uuid, page: PageQuery) -> ApiResult<Paginated<Comment>> {
        self.client.get_with_query(&format!("/posts/{post_id}/comments"), page.to_pairs()).await
    }

    /// Add a comment
    pub async fn add_comment(&self, post_id: Uuid, data: &CreateComment) -> ApiResult<Comment> {
        let comment: Comment =
            self.client.post(&format!("/posts/{post_id}/comments"), data).await?;
        self.cache.invalidate("posts:");
        Ok(comment)
    }

    /// Delete a comment
    pub async fn delete_comment(&self, comment_id: Uuid) -> ApiResult<()> {
        self.client.delete_unit(&format!("/comments/{comment_id}")).await?;
        self.cache.invalidate("posts:");
        Ok(())
    }
}
