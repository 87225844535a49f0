/// Friend-request lifecycle: send, approve, reject, list.
///
/// Approval turns the pending request into a follow edge inside one
/// transaction that also keeps the mutuality flags and follower counters
/// consistent; rejection simply discards the request.
use crate::error::{AppError, Result};
use crate::models::{AccountStatus, FriendRequest, Friendship};
use crate::pagination::{Filter, PagedResult};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Public account summary shown in friend-request listings.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestSummary {
    pub id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub user: AccountSummary,
}

/// Which side of the pending requests to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDirection {
    Sent,
    Received,
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRef {
    id: Uuid,
    username: String,
    account_status: String,
    is_suspended: bool,
}

pub struct FriendRequestService {
    pool: PgPool,
    daily_limit: i64,
}

impl FriendRequestService {
    pub fn new(pool: PgPool, daily_limit: i64) -> Self {
        Self { pool, daily_limit }
    }

    /// Send a friend request from `sender_username` to `receiver_username`.
    pub async fn send_friend_request(
        &self,
        sender_username: &str,
        receiver_username: &str,
    ) -> Result<()> {
        let sender = self
            .account_ref(sender_username)
            .await?
            .ok_or_else(|| AppError::NotFound("Sender not found, check and try again".to_string()))?;

        if self.exceeds_request_limit(sender.id).await? {
            return Err(AppError::TooManyRequests(
                "Daily friend request limit exceeded".to_string(),
            ));
        }

        let receiver = self.account_ref(receiver_username).await?.ok_or_else(|| {
            AppError::NotFound("Receiver not found, check and try again".to_string())
        })?;

        if sender.id == receiver.id {
            return Err(AppError::BadRequest(
                "You can't send friend request to yourself".to_string(),
            ));
        }

        if receiver.account_status != AccountStatus::Active.as_str() || receiver.is_suspended {
            return Err(AppError::BadRequest(
                "Receiver account is not active at the moment to receive friend requests"
                    .to_string(),
            ));
        }

        let pending = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM friend_requests
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            "#,
        )
        .bind(sender.id)
        .bind(receiver.id)
        .fetch_one(&self.pool)
        .await?;

        if pending > 0 {
            return Err(AppError::Conflict("Friend request already sent.".to_string()));
        }

        let already_friends = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM friendships
            WHERE (follower_id = $1 AND followee_id = $2)
               OR (follower_id = $2 AND followee_id = $1)
            "#,
        )
        .bind(sender.id)
        .bind(receiver.id)
        .fetch_one(&self.pool)
        .await?;

        if already_friends > 0 {
            return Err(AppError::Conflict(
                "You are already friends with this user.".to_string(),
            ));
        }

        sqlx::query(
            "INSERT INTO friend_requests (id, sender_id, receiver_id) VALUES ($1, $2, $3)",
        )
        .bind(Uuid::new_v4())
        .bind(sender.id)
        .bind(receiver.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_write(e, "Sorry! We could not send your friend request, try again.")
        })?;

        tracing::info!(
            sender = %sender.username,
            receiver = %receiver.username,
            "Friend request sent"
        );
        Ok(())
    }

    /// Approve a pending request. Only the receiver may approve.
    ///
    /// Inserts the follow edge (follower = sender, followee = approver),
    /// recomputes mutuality from the reciprocal edge, bumps both follower
    /// counters and deletes the request, all in one transaction.
    pub async fn approve_friend_request(&self, request_id: Uuid, username: &str) -> Result<()> {
        let request = self.load_request(request_id).await?;

        let user = self
            .account_ref(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if request.receiver_id != user.id {
            return Err(AppError::Unauthorized(
                "You can only approve friend requests sent to you".to_string(),
            ));
        }
        if request.sender_id == user.id {
            return Err(AppError::Forbidden(
                "You cannot approve your own friend request".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let reciprocal = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT id, follower_id, followee_id, followed_at, is_mutual
            FROM friendships
            WHERE follower_id = $1 AND followee_id = $2
            "#,
        )
        .bind(user.id)
        .bind(request.sender_id)
        .fetch_optional(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO friendships (id, follower_id, followee_id, is_mutual)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.sender_id)
        .bind(user.id)
        .bind(reciprocal.is_some())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::from_write(e, "Something bad happened when approving friend requests")
        })?;

        if let Some(reciprocal) = reciprocal {
            sqlx::query("UPDATE friendships SET is_mutual = TRUE WHERE id = $1")
                .bind(reciprocal.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE accounts SET total_following = total_following + 1 WHERE id = $1")
            .bind(request.sender_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE accounts SET total_followers = total_followers + 1 WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() < 1 {
            return Err(AppError::FailedDependency(
                "Something bad happened when approving friend requests".to_string(),
            ));
        }

        tx.commit().await?;

        tracing::info!(request_id = %request_id, approver = %user.username, "Friend request approved");
        Ok(())
    }

    /// Reject a pending request. Only the receiver may reject; the request
    /// is discarded and no follow edge is created.
    pub async fn reject_friend_request(&self, request_id: Uuid, username: &str) -> Result<()> {
        let request = self.load_request(request_id).await?;

        let user = self
            .account_ref(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if request.receiver_id != user.id {
            return Err(AppError::Unauthorized(
                "You can only reject friend requests sent to you".to_string(),
            ));
        }
        if request.sender_id == user.id {
            return Err(AppError::Forbidden(
                "You cannot reject your own friend request".to_string(),
            ));
        }

        let deleted = sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() < 1 {
            return Err(AppError::FailedDependency(
                "Something bad happened when rejecting friend requests".to_string(),
            ));
        }

        tracing::info!(request_id = %request_id, rejecter = %user.username, "Friend request rejected");
        Ok(())
    }

    /// List pending requests sent by or received by `username`, newest
    /// first, each resolved to the counterpart's public summary.
    pub async fn get_friend_requests(
        &self,
        username: &str,
        filter: &Filter,
        direction: RequestDirection,
    ) -> Result<PagedResult<FriendRequestSummary>> {
        let user = self.account_ref(username).await?.ok_or_else(|| {
            AppError::NotFound("Could not retrieve user details, check and try again.".to_string())
        })?;

        let (count_sql, page_sql) = match direction {
            RequestDirection::Sent => (
                "SELECT COUNT(*) FROM friend_requests WHERE sender_id = $1",
                r#"
                SELECT fr.id, fr.requested_at,
                       a.id AS account_id, a.username, a.full_name, a.profile_picture_url
                FROM friend_requests fr
                JOIN accounts a ON a.id = fr.receiver_id
                WHERE fr.sender_id = $1
                ORDER BY fr.requested_at DESC
                LIMIT $2 OFFSET $3
                "#,
            ),
            RequestDirection::Received => (
                "SELECT COUNT(*) FROM friend_requests WHERE receiver_id = $1",
                r#"
                SELECT fr.id, fr.requested_at,
                       a.id AS account_id, a.username, a.full_name, a.profile_picture_url
                FROM friend_requests fr
                JOIN accounts a ON a.id = fr.sender_id
                WHERE fr.receiver_id = $1
                ORDER BY fr.requested_at DESC
                LIMIT $2 OFFSET $3
                "#,
            ),
        };

        let total = sqlx::query_scalar::<_, i64>(count_sql)
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<
            _,
            (Uuid, DateTime<Utc>, Uuid, String, String, Option<String>),
        >(page_sql)
        .bind(user.id)
        .bind(filter.size())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        let results = rows
            .into_iter()
            .map(
                |(id, requested_at, account_id, username, full_name, profile_picture_url)| {
                    FriendRequestSummary {
                        id,
                        requested_at,
                        user: AccountSummary {
                            id: account_id,
                            username,
                            full_name,
                            profile_picture_url,
                        },
                    }
                },
            )
            .collect();

        Ok(PagedResult::new(results, filter, total))
    }

    /// Rolling 24-hour cap on requests sent by one account.
    async fn exceeds_request_limit(&self, sender_id: Uuid) -> Result<bool> {
        let cutoff = Utc::now() - Duration::hours(24);

        let sent = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM friend_requests WHERE sender_id = $1 AND requested_at >= $2",
        )
        .bind(sender_id)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(sent >= self.daily_limit)
    }

    async fn load_request(&self, request_id: Uuid) -> Result<FriendRequest> {
        sqlx::query_as::<_, FriendRequest>(
            "SELECT id, sender_id, receiver_id, requested_at FROM friend_requests WHERE id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Friend request not found".to_string()))
    }

    async fn account_ref(&self, username: &str) -> Result<Option<AccountRef>> {
        let account = sqlx::query_as::<_, AccountRef>(
            "SELECT id, username, account_status, is_suspended FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }
}
