//! Post, comment and media shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

/// Publication state of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
    Deleted,
}

/// Who can see a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostVisibility {
    Public,
    Followers,
    Private,
}

/// Kind of attached media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Gif,
}

/// Uploaded media attachment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: Uuid,
    pub url: String,
    pub thumbnail_url: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size: u64,
    pub alt_text: Option<String>,
}

/// Hashtag with usage stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: Uuid,
    pub name: String,
    pub posts_count: u64,
}

/// Post as returned by feed and detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author: User,
    pub content: String,
    #[serde(default)]
    pub media_files: Vec<MediaFile>,
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,

    // Counters
    pub likes_count: u64,
    pub comments_count: u64,
    pub reposts_count: u64,

    // Viewer-relative flags
    pub is_liked: bool,
    pub is_reposted: bool,
    pub is_bookmarked: bool,

    pub status: PostStatus,
    pub visibility: PostVisibility,
    pub is_edited: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment on a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Id of the post this comment belongs to
    pub post: Uuid,
    pub author: User,
    pub content: String,
    pub likes_count: u64,
    pub replies_count: u64,
    pub is_liked: bool,
    pub parent_comment: Option<Uuid>,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for `POST /posts`
#[derive(Debug, Clone, Serialize)]
pub struct CreatePost {
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hashtags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<PostVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<Uuid>,
}

impl CreatePost {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), hashtags: Vec::new(), visibility: None, reply_to_id: None }
    }
}

/// Body for `PUT /posts/{id}`
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<PostVisibility>,
}

/// Body for `POST /posts/{id}/comments`
#[derive(Debug, Clone, Serialize)]
pub struct CreateComment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<Uuid>,
}

/// Payload of like/unlike responses
#[derive(Debug, Clone, Deserialize)]
pub struct LikePayload {
    pub is_liked: bool,
    pub likes_count: u64,
}
