/// Like toggles for posts and comments, plus liker listings.
///
/// The toggle is idempotent: liking twice or unliking without a prior like
/// changes nothing, and the current total for the target comes back either
/// way.
use crate::error::{AppError, Result};
use crate::models::Like;
use crate::pagination::{Filter, PagedResult};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub is_like: bool,
}

/// Public account summary shown in liker listings.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LikerSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

pub struct LikeService {
    pool: PgPool,
}

impl LikeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Toggle `username`'s like on a post; returns the post's like total.
    pub async fn handle_post_like(
        &self,
        post_id: Uuid,
        username: &str,
        is_like: bool,
    ) -> Result<i64> {
        let post_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        if post_exists < 1 {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let account_id = self.account_id(username).await?;

        let existing = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, account_id, post_id, comment_id, created_at
            FROM likes
            WHERE account_id = $1 AND post_id = $2 AND comment_id IS NULL
            "#,
        )
        .bind(account_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        match (is_like, existing) {
            (true, None) => {
                // ON CONFLICT keeps the toggle idempotent under races.
                sqlx::query(
                    r#"
                    INSERT INTO likes (id, account_id, post_id)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (account_id, post_id) WHERE comment_id IS NULL DO NOTHING
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(account_id)
                .bind(post_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::from_write(
                        e,
                        "Sorry! We could not complete the like post request, try again.",
                    )
                })?;
            }
            (false, Some(like)) => {
                sqlx::query("DELETE FROM likes WHERE id = $1")
                    .bind(like.id)
                    .execute(&self.pool)
                    .await?;
            }
            // Already in the requested state.
            _ => {}
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE post_id = $1 AND comment_id IS NULL",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Toggle `username`'s like on a comment; returns the comment's like
    /// total.
    pub async fn handle_comment_like(
        &self,
        comment_id: Uuid,
        username: &str,
        is_like: bool,
    ) -> Result<i64> {
        let post_id = sqlx::query_scalar::<_, Uuid>("SELECT post_id FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        let account_id = self.account_id(username).await?;

        let existing = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, account_id, post_id, comment_id, created_at
            FROM likes
            WHERE account_id = $1 AND comment_id = $2
            "#,
        )
        .bind(account_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        match (is_like, existing) {
            (true, None) => {
                sqlx::query(
                    r#"
                    INSERT INTO likes (id, account_id, post_id, comment_id)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (account_id, comment_id) WHERE comment_id IS NOT NULL DO NOTHING
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(account_id)
                .bind(post_id)
                .bind(comment_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::from_write(
                        e,
                        "Sorry! We could not complete the like comment request, try again.",
                    )
                })?;
            }
            (false, Some(like)) => {
                sqlx::query("DELETE FROM likes WHERE id = $1")
                    .bind(like.id)
                    .execute(&self.pool)
                    .await?;
            }
            // Already in the requested state.
            _ => {}
        }

        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE comment_id = $1")
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Accounts that liked a post, most recent like first.
    pub async fn get_users_who_liked_post(
        &self,
        post_id: Uuid,
        filter: &Filter,
    ) -> Result<PagedResult<LikerSummary>> {
        let post_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        if post_exists < 1 {
            return Err(AppError::NotFound(
                "Sorry! Post does not exist, check and try again.".to_string(),
            ));
        }

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE post_id = $1 AND comment_id IS NULL",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        let results = sqlx::query_as::<_, LikerSummary>(
            r#"
            SELECT a.id, a.username, a.full_name, a.bio, a.profile_picture_url
            FROM likes l
            JOIN accounts a ON a.id = l.account_id
            WHERE l.post_id = $1 AND l.comment_id IS NULL
            ORDER BY l.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(filter.size())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PagedResult::new(results, filter, total))
    }

    /// Accounts that liked a comment, most recent like first.
    pub async fn get_users_who_liked_comment(
        &self,
        comment_id: Uuid,
        filter: &Filter,
    ) -> Result<PagedResult<LikerSummary>> {
        let comment_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE id = $1")
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;
        if comment_exists < 1 {
            return Err(AppError::NotFound(
                "Sorry! Comment does not exist, check and try again.".to_string(),
            ));
        }

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE comment_id = $1")
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;

        let results = sqlx::query_as::<_, LikerSummary>(
            r#"
            SELECT a.id, a.username, a.full_name, a.bio, a.profile_picture_url
            FROM likes l
            JOIN accounts a ON a.id = l.account_id
            WHERE l.comment_id = $1
            ORDER BY l.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(comment_id)
        .bind(filter.size())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PagedResult::new(results, filter, total))
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
}
