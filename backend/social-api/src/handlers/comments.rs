/// Comment handlers.
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::pagination::Filter;
use crate::response;
use crate::services::comments::AddCommentRequest;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /api/v1/comments
pub async fn add_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<AddCommentRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let service = CommentService::new((**pool).clone());
    let comment = service
        .add_comment(&user.username, payload.into_inner())
        .await?;

    Ok(response::created("Comment added successfully", comment))
}

/// GET /api/v1/posts/{postId}/comments
pub async fn get_post_comments(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    filter: web::Query<Filter>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let page = service.get_post_comments(*post_id, &filter).await?;

    Ok(response::ok("Comments fetched successfully", page))
}

/// GET /api/v1/comments/{commentId}
pub async fn get_comment_tree(
    pool: web::Data<PgPool>,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let tree = service.get_comment_with_replies(*comment_id).await?;

    Ok(response::ok(
        "Comment and its replies fetched successfully",
        tree,
    ))
}

/// DELETE /api/v1/comments/{commentId}
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    service.delete_comment(*comment_id, &user.username).await?;

    Ok(response::ok("Comment and replies deleted successfully", true))
}
