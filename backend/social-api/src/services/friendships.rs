/// Follow-edge queries and the transactional unfollow.
use crate::error::{AppError, Result};
use crate::pagination::{Filter, PagedResult};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Public account summary shown in follower/following listings.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FollowSummary {
    pub username: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub is_mutual: bool,
}

pub struct FriendshipService {
    pool: PgPool,
}

impl FriendshipService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Accounts following `username`, newest edge first.
    pub async fn get_user_followers(
        &self,
        username: &str,
        filter: &Filter,
    ) -> Result<PagedResult<FollowSummary>> {
        let user_id = self
            .account_id(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found, check and try again".to_string()))?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM friendships WHERE followee_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let results = sqlx::query_as::<_, FollowSummary>(
            r#"
            SELECT a.username, a.full_name, a.bio, a.profile_picture_url, f.is_mutual
            FROM friendships f
            JOIN accounts a ON a.id = f.follower_id
            WHERE f.followee_id = $1
            ORDER BY f.followed_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(filter.size())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PagedResult::new(results, filter, total))
    }

    /// Accounts `username` follows, newest edge first.
    pub async fn get_user_following(
        &self,
        username: &str,
        filter: &Filter,
    ) -> Result<PagedResult<FollowSummary>> {
        let user_id = self
            .account_id(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found, check and try again".to_string()))?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM friendships WHERE follower_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let results = sqlx::query_as::<_, FollowSummary>(
            r#"
            SELECT a.username, a.full_name, a.bio, a.profile_picture_url, f.is_mutual
            FROM friendships f
            JOIN accounts a ON a.id = f.followee_id
            WHERE f.follower_id = $1
            ORDER BY f.followed_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(filter.size())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(PagedResult::new(results, filter, total))
    }

    /// Remove the follow edge follower -> followee.
    ///
    /// The edge deletion, the reciprocal-edge mutuality reset and both
    /// counter decrements are one all-or-nothing unit; failing any sub-step
    /// rolls back the whole operation.
    pub async fn unfollow_user(
        &self,
        follower_username: &str,
        followee_username: &str,
    ) -> Result<()> {
        let follower_id = self
            .account_id(follower_username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found, check and try again".to_string()))?;
        let followee_id = self.account_id(followee_username).await?.ok_or_else(|| {
            AppError::NotFound("User to unfollow not found, check and try again".to_string())
        })?;

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM friendships WHERE follower_id = $1 AND followee_id = $2",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() < 1 {
            // Dropping the transaction rolls it back.
            return Err(AppError::NotFound(
                "You are not following this user".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE friendships SET is_mutual = FALSE WHERE follower_id = $1 AND followee_id = $2",
        )
        .bind(followee_id)
        .bind(follower_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE accounts SET total_followers = total_followers - 1 WHERE id = $1")
            .bind(followee_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE accounts SET total_following = total_following - 1 WHERE id = $1")
            .bind(follower_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            follower = %follower_username,
            followee = %followee_username,
            "Unfollowed user"
        );
        Ok(())
    }

    async fn account_id(&self, username: &str) -> Result<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}
