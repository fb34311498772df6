//! User account and profile shapes

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User as embedded in feeds, comments and conversation listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,

    // Social graph counters
    pub followers_count: u64,
    pub following_count: u64,
    pub posts_count: u64,

    // Viewer-relative flags; absent outside an authenticated context
    pub is_following: Option<bool>,
    pub is_followed_by: Option<bool>,
}

/// Extended profile returned by `/users/{username}` and `/users/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update for `PUT /users/me`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Payload of `/users/{id}/following-status`
#[derive(Debug, Clone, Deserialize)]
pub struct FollowingStatus {
    pub is_following: bool,
}

/// Payload of avatar upload responses
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarPayload {
    pub avatar: String,
}

#[cfg(test)]
mod tests {
    //! Unit tests for user wire shapes.
    use super::*;

    fn sample_user_json() -> &'static str {
        r#"{
            "id": "6f2a3bd4-9c1e-4a7f-8a70-5a3c8d2f1e90",
            "username": "alice",
            "email": "alice@example.com",
            "first_name": "Alice",
            "last_name": "Anders",
            "avatar": null,
            "is_verified": true,
            "is_active": true,
            "date_joined": "2024-03-01T12:00:00Z",
            "last_login": null,
            "followers_count": 10,
            "following_count": 4,
            "posts_count": 7,
            "is_following": true,
            "is_followed_by": null
        }"#
    }

    /// Validates a user deserializes from the backend's wire shape.
    #[test]
    fn test_user_wire_shape() {
        let user: User = serde_json::from_str(sample_user_json()).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.followers_count, 10);
        assert_eq!(user.is_following, Some(true));
        assert_eq!(user.is_followed_by, None);
    }

    /// Validates a partial update serializes only the set fields.
    #[test]
    fn test_profile_update_is_partial() {
        let update = ProfileUpdate { bio: Some("hello".into()), ..ProfileUpdate::default() };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"bio":"hello"}"#);
    }
}
