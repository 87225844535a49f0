/// Nested comments: creation, tree reconstruction and deletion.
///
/// `get_post_comments` pages over a post's comments and links replies to
/// parents within the fetched page; a reply whose parent was paginated out
/// is promoted to a root of that page. `get_comment_with_replies` is the
/// exact-subtree alternative, materializing the full reply tree iteratively.
use crate::error::{AppError, Result};
use crate::models::Comment;
use crate::pagination::{Filter, PagedResult};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub post_id: Uuid,
    #[validate(length(min = 1, max = 2000, message = "content must be 1-2000 characters"))]
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub account_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            account_id: comment.account_id,
            parent_comment_id: comment.parent_comment_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

/// One node of a reconstructed reply tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub comment_id: Uuid,
    pub account_id: Uuid,
    pub username: String,
    pub profile_picture_url: Option<String>,
    pub content: String,
    pub like_count: i64,
    pub replies: Vec<CommentNode>,
}

/// A fetched comment row joined with its author's public fields.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub account_id: Uuid,
    pub username: String,
    pub profile_picture_url: Option<String>,
    pub content: String,
}

/// Link fetched comments into a reply forest.
///
/// Each comment attaches to its parent when the parent is present in
/// `rows`; otherwise it becomes a root. Input order is preserved both for
/// roots and within reply lists. `like_counts` supplies per-comment totals;
/// absent ids render as 0.
pub fn build_comment_tree(
    rows: &[CommentRow],
    like_counts: &HashMap<Uuid, i64>,
) -> Vec<CommentNode> {
    let present: HashMap<Uuid, &CommentRow> = rows.iter().map(|r| (r.id, r)).collect();

    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    let mut roots: Vec<Uuid> = Vec::new();

    for row in rows {
        match row.parent_comment_id {
            Some(parent) if present.contains_key(&parent) => {
                children.entry(parent).or_default().push(row.id);
            }
            // No parent, or the parent fell outside this page.
            _ => roots.push(row.id),
        }
    }

    roots
        .iter()
        .map(|id| assemble(*id, &present, &children, like_counts))
        .collect()
}

fn assemble(
    id: Uuid,
    present: &HashMap<Uuid, &CommentRow>,
    children: &HashMap<Uuid, Vec<Uuid>>,
    like_counts: &HashMap<Uuid, i64>,
) -> CommentNode {
    let row = present[&id];
    let replies = children
        .get(&id)
        .map(|ids| {
            ids.iter()
                .map(|child| assemble(*child, present, children, like_counts))
                .collect()
        })
        .unwrap_or_default();

    CommentNode {
        comment_id: row.id,
        account_id: row.account_id,
        username: row.username.clone(),
        profile_picture_url: row.profile_picture_url.clone(),
        content: row.content.clone(),
        like_count: like_counts.get(&id).copied().unwrap_or(0),
        replies,
    }
}

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a comment, optionally as a reply. A given parent must belong to
    /// the same post.
    pub async fn add_comment(
        &self,
        username: &str,
        request: AddCommentRequest,
    ) -> Result<CommentResponse> {
        let account_id = self.account_id(username).await?;

        let post_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = $1")
            .bind(request.post_id)
            .fetch_one(&self.pool)
            .await?;
        if post_exists < 1 {
            return Err(AppError::NotFound(
                "Sorry! Post does not exist, check and try again.".to_string(),
            ));
        }

        if let Some(parent_id) = request.parent_comment_id {
            let parent_in_post = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM comments WHERE id = $1 AND post_id = $2",
            )
            .bind(parent_id)
            .bind(request.post_id)
            .fetch_one(&self.pool)
            .await?;
            if parent_in_post < 1 {
                return Err(AppError::NotFound(
                    "Parent comment not found, check and try again.".to_string(),
                ));
            }
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, account_id, content, parent_comment_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, account_id, content, parent_comment_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.post_id)
        .bind(account_id)
        .bind(&request.content)
        .bind(request.parent_comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "Sorry! We could not add the comment, try again."))?;

        Ok(comment.into())
    }

    /// A page of a post's comments, newest first, reassembled into a reply
    /// forest with per-node like counts.
    pub async fn get_post_comments(
        &self,
        post_id: Uuid,
        filter: &Filter,
    ) -> Result<PagedResult<CommentNode>> {
        let post_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        if post_exists < 1 {
            return Err(AppError::NotFound(
                "Post does not exist, check and try again.".to_string(),
            ));
        }

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.parent_comment_id, c.account_id,
                   a.username, a.profile_picture_url, c.content
            FROM comments c
            JOIN accounts a ON a.id = c.account_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(filter.size())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        let mut like_counts = HashMap::with_capacity(rows.len());
        for row in &rows {
            like_counts.insert(row.id, self.comment_like_count(row.id).await?);
        }

        let results = build_comment_tree(&rows, &like_counts);
        Ok(PagedResult::new(results, filter, total))
    }

    /// A comment with its full reply subtree, materialized iteratively.
    /// The root carries its like count.
    pub async fn get_comment_with_replies(&self, comment_id: Uuid) -> Result<CommentNode> {
        let root = self
            .comment_row(comment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Comment with id {} not found.", comment_id))
            })?;

        let mut nodes: HashMap<Uuid, CommentRow> = HashMap::new();
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        nodes.insert(root.id, root);

        let mut stack = vec![comment_id];
        while let Some(current) = stack.pop() {
            let replies = sqlx::query_as::<_, CommentRow>(
                r#"
                SELECT c.id, c.parent_comment_id, c.account_id,
                       a.username, a.profile_picture_url, c.content
                FROM comments c
                JOIN accounts a ON a.id = c.account_id
                WHERE c.parent_comment_id = $1
                ORDER BY c.created_at ASC
                "#,
            )
            .bind(current)
            .fetch_all(&self.pool)
            .await?;

            for reply in replies {
                children.entry(current).or_default().push(reply.id);
                stack.push(reply.id);
                nodes.insert(reply.id, reply);
            }
        }

        let mut like_counts = HashMap::new();
        like_counts.insert(comment_id, self.comment_like_count(comment_id).await?);

        let present: HashMap<Uuid, &CommentRow> = nodes.iter().map(|(id, r)| (*id, r)).collect();
        Ok(assemble(comment_id, &present, &children, &like_counts))
    }

    /// Owner-only deletion; replies and likes cascade at the storage layer.
    pub async fn delete_comment(&self, comment_id: Uuid, username: &str) -> Result<()> {
        let account_id = self.account_id(username).await?;

        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE id = $1 AND account_id = $2",
        )
        .bind(comment_id)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;
        if owned < 1 {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1 AND account_id = $2")
            .bind(comment_id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() < 1 {
            return Err(AppError::FailedDependency(
                "Sorry! We could not delete comment, try again.".to_string(),
            ));
        }

        tracing::info!(comment_id = %comment_id, username = %username, "Comment deleted");
        Ok(())
    }

    async fn comment_row(&self, comment_id: Uuid) -> Result<Option<CommentRow>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.parent_comment_id, c.account_id,
                   a.username, a.profile_picture_url, c.content
            FROM comments c
            JOIN accounts a ON a.id = c.account_id
            WHERE c.id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn comment_like_count(&self, comment_id: Uuid) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE comment_id = $1")
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn account_id(&self, username: &str) -> Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Sorry! User does not exist, check and try again.".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Uuid, parent: Option<Uuid>, content: &str) -> CommentRow {
        CommentRow {
            id,
            parent_comment_id: parent,
            account_id: Uuid::new_v4(),
            username: "ada".to_string(),
            profile_picture_url: None,
            content: content.to_string(),
        }
    }

    #[test]
    fn replies_attach_to_in_page_parents() {
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let rows = vec![row(c1, None, "root"), row(c2, Some(c1), "reply")];

        let tree = build_comment_tree(&rows, &HashMap::new());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].comment_id, c1);
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].comment_id, c2);
        assert_eq!(tree[0].like_count, 0);
        assert_eq!(tree[0].replies[0].like_count, 0);
    }

    #[test]
    fn nesting_goes_arbitrarily_deep() {
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let c3 = Uuid::new_v4();
        let rows = vec![
            row(c1, None, "root"),
            row(c2, Some(c1), "reply"),
            row(c3, Some(c2), "reply to reply"),
        ];

        let tree = build_comment_tree(&rows, &HashMap::new());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].replies[0].replies[0].comment_id, c3);
    }

    #[test]
    fn out_of_page_parents_promote_replies_to_roots() {
        let missing_parent = Uuid::new_v4();
        let orphan = Uuid::new_v4();
        let root = Uuid::new_v4();
        let rows = vec![
            row(root, None, "root"),
            row(orphan, Some(missing_parent), "orphaned reply"),
        ];

        let tree = build_comment_tree(&rows, &HashMap::new());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment_id, root);
        assert_eq!(tree[1].comment_id, orphan);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn like_counts_annotate_matching_nodes() {
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let rows = vec![row(c1, None, "root"), row(c2, Some(c1), "reply")];

        let mut likes = HashMap::new();
        likes.insert(c2, 3i64);

        let tree = build_comment_tree(&rows, &likes);
        assert_eq!(tree[0].like_count, 0);
        assert_eq!(tree[0].replies[0].like_count, 3);
    }

    #[test]
    fn sibling_order_follows_input_order() {
        let c1 = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let rows = vec![
            row(c1, None, "root"),
            row(first, Some(c1), "first"),
            row(second, Some(c1), "second"),
        ];

        let tree = build_comment_tree(&rows, &HashMap::new());
        let replies: Vec<Uuid> = tree[0].replies.iter().map(|n| n.comment_id).collect();
        assert_eq!(replies, vec![first, second]);
    }
}
