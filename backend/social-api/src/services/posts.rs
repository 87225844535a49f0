/// Post CRUD with ownership checks and like-count annotation.
use crate::error::{AppError, Result};
use crate::models::{MediaItem, MediaType, Post};
use crate::pagination::{Filter, PagedResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Media attachments allowed per post.
pub const MAX_POST_MEDIA_ITEMS: usize = 5;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    #[validate(length(min = 1, max = 4000, message = "content must be 1-4000 characters"))]
    pub content: String,
    #[serde(default)]
    #[validate(custom(function = validate_media_items))]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub location: String,
}

fn media_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("media");
    err.message = Some(message.into());
    err
}

fn validate_media_items(media: &[MediaItem]) -> std::result::Result<(), ValidationError> {
    if media.len() > MAX_POST_MEDIA_ITEMS {
        return Err(media_error("a post can carry at most 5 media items"));
    }
    for item in media {
        if item.media_type == MediaType::Other {
            return Err(media_error("media type must be image, video or gif"));
        }
        if item.url.trim().is_empty() {
            return Err(media_error("media url must not be empty"));
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub content: String,
    pub media: Vec<MediaItem>,
    pub location: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PostResponse {
    fn from_post(post: Post, like_count: i64) -> Self {
        Self {
            id: post.id,
            account_id: post.account_id,
            content: post.content,
            media: post.media.0,
            location: post.location,
            like_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post for `username`, bumping the account's post counter.
    pub async fn create_post(&self, username: &str, request: PostRequest) -> Result<PostResponse> {
        let account_id = self.account_id(username).await?;

        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, account_id, content, media, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, account_id, content, media, location, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&request.content)
        .bind(Json(&request.media))
        .bind(&request.location)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, "We could not save user post, please try again"))?;

        sqlx::query("UPDATE accounts SET total_posts = total_posts + 1 WHERE id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(username = %username, post_id = %post.id, "Post created");
        Ok(PostResponse::from_post(post, 0))
    }

    /// Page of `username`'s posts, newest first, like counts annotated.
    pub async fn get_user_posts(
        &self,
        username: &str,
        filter: &Filter,
    ) -> Result<PagedResult<PostResponse>> {
        let account_id = self.account_id(username).await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE account_id = $1")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await?;

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, account_id, content, media, location, created_at, updated_at
            FROM posts
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(filter.size())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        let mut results = Vec::with_capacity(posts.len());
        for post in posts {
            let like_count = self.post_like_count(post.id).await?;
            results.push(PostResponse::from_post(post, like_count));
        }

        Ok(PagedResult::new(results, filter, total))
    }

    /// A single post owned by `username`.
    pub async fn get_user_post(&self, username: &str, post_id: Uuid) -> Result<PostResponse> {
        let account_id = self.account_id(username).await?;

        let post = self
            .owned_post(post_id, account_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Sorry! Post does not exist, check and try again.".to_string())
            })?;

        let like_count = self.post_like_count(post.id).await?;
        Ok(PostResponse::from_post(post, like_count))
    }

    /// Replace content/media/location of an owned post, stamping updated_at.
    pub async fn update_post(
        &self,
        username: &str,
        post_id: Uuid,
        request: PostRequest,
    ) -> Result<PostResponse> {
        let account_id = self.account_id(username).await?;

        if self.owned_post(post_id, account_id).await?.is_none() {
            return Err(AppError::NotFound(
                "Sorry! Post does not exist, check and try again.".to_string(),
            ));
        }

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET content = $3, media = $4, location = $5, updated_at = NOW()
            WHERE id = $1 AND account_id = $2
            RETURNING id, account_id, content, media, location, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(account_id)
        .bind(&request.content)
        .bind(Json(&request.media))
        .bind(&request.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "We could not update user post, please try again"))?;

        let like_count = self.post_like_count(post.id).await?;
        Ok(PostResponse::from_post(post, like_count))
    }

    /// Delete an owned post; comments and likes cascade at the storage
    /// layer, and the account's post counter is decremented.
    pub async fn delete_post(&self, username: &str, post_id: Uuid) -> Result<()> {
        let account_id = self.account_id(username).await?;

        if self.owned_post(post_id, account_id).await?.is_none() {
            return Err(AppError::NotFound(
                "Sorry! Post does not exist, check and try again.".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1 AND account_id = $2")
            .bind(post_id)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() < 1 {
            return Err(AppError::FailedDependency(
                "Sorry! We could not delete the post, try again.".to_string(),
            ));
        }

        sqlx::query("UPDATE accounts SET total_posts = total_posts - 1 WHERE id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(username = %username, post_id = %post_id, "Post deleted");
        Ok(())
    }

    async fn account_id(&self, username: &str) -> Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Sorry! User {} does not exist, check and try again.",
                    username
                ))
            })
    }

    async fn owned_post(&self, post_id: Uuid, account_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, account_id, content, media, location, created_at, updated_at
            FROM posts
            WHERE id = $1 AND account_id = $2
            "#,
        )
        .bind(post_id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn post_like_count(&self, post_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE post_id = $1 AND comment_id IS NULL",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(media_type: MediaType, url: &str) -> MediaItem {
        MediaItem {
            media_type,
            url: url.to_string(),
        }
    }

    #[test]
    fn media_validation_accepts_the_three_post_types() {
        let items = vec![
            media(MediaType::Image, "https://cdn/p.png"),
            media(MediaType::Video, "https://cdn/v.mp4"),
            media(MediaType::Gif, "https://cdn/g.gif"),
        ];
        assert!(validate_media_items(&items).is_ok());
    }

    #[test]
    fn media_validation_rejects_other_and_overflow() {
        let items = vec![media(MediaType::Other, "https://cdn/x.bin")];
        assert!(validate_media_items(&items).is_err());

        let too_many = vec![media(MediaType::Image, "https://cdn/p.png"); 6];
        assert!(validate_media_items(&too_many).is_err());
    }

    #[test]
    fn media_validation_rejects_empty_urls() {
        let items = vec![media(MediaType::Image, "  ")];
        assert!(validate_media_items(&items).is_err());
    }
}
