use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Account lifecycle status, stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Suspended,
    Deactivated,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Suspended => "Suspended",
            AccountStatus::Deactivated => "Deactivated",
        }
    }
}

/// Account privacy level, stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivacyLevel {
    Public,
    Private,
}

impl PrivacyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyLevel::Public => "Public",
            PrivacyLevel::Private => "Private",
        }
    }
}

/// A spoken-language preference attached to an account profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePreference {
    pub language: String,
}

/// An external link (website, portfolio, ...) attached to an account profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLink {
    pub name: String,
    pub url: String,
}

/// Free-form account location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Account record. Never hard-deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
    pub account_status: String,
    pub privacy_level: String,
    pub is_verified: bool,
    pub is_suspended: bool,
    pub refresh_token: Option<String>,
    pub refresh_token_added_at: Option<DateTime<Utc>>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub total_posts: i32,
    pub total_followers: i32,
    pub total_following: i32,
    pub language_preferences: Json<Vec<LanguagePreference>>,
    pub external_links: Json<Vec<ExternalLink>>,
    pub location: Json<Location>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_activity_at: DateTime<Utc>,
}

/// Media attachment type. `Other` only appears in upload type inference;
/// posts accept image, video and gif.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Gif,
    Other,
}

/// One ordered media attachment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub media_type: MediaType,
    pub url: String,
}

/// Post record, owned exclusively by one account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub account_id: Uuid,
    pub content: String,
    pub media: Json<Vec<MediaItem>>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Comment record. `parent_comment_id` forms a self-referential tree; a
/// parent always belongs to the same post.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub account_id: Uuid,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Like record. A post like has `comment_id` NULL; a comment like carries
/// both the comment id and that comment's post id.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub account_id: Uuid,
    pub post_id: Uuid,
    pub comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Pending friend request. Deleted on approval or rejection, never mutated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FriendRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub requested_at: DateTime<Utc>,
}

/// Directed follow edge. `is_mutual` is true iff the reciprocal edge exists.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Friendship {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub followed_at: DateTime<Utc>,
    pub is_mutual: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(MediaType::Image).unwrap(), "image");
        assert_eq!(serde_json::to_value(MediaType::Gif).unwrap(), "gif");
    }

    #[test]
    fn account_status_round_trips_through_text() {
        assert_eq!(AccountStatus::Active.as_str(), "Active");
        assert_eq!(AccountStatus::Deactivated.as_str(), "Deactivated");
    }
}
