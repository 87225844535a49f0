/// Like handlers for posts and comments.
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::pagination::Filter;
use crate::response;
use crate::services::likes::LikeRequest;
use crate::services::LikeService;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

/// POST /api/v1/posts/{postId}/like
pub async fn toggle_post_like(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    payload: web::Json<LikeRequest>,
) -> Result<HttpResponse> {
    let service = LikeService::new((**pool).clone());
    let count = service
        .handle_post_like(*post_id, &user.username, payload.is_like)
        .await?;

    Ok(response::ok("Successful", count))
}

/// GET /api/v1/posts/{postId}/likes
pub async fn post_likers(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    filter: web::Query<Filter>,
) -> Result<HttpResponse> {
    let service = LikeService::new((**pool).clone());
    let page = service.get_users_who_liked_post(*post_id, &filter).await?;

    Ok(response::ok(
        "Users who liked the post fetched successfully",
        page,
    ))
}

/// POST /api/v1/comments/{commentId}/like
pub async fn toggle_comment_like(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
    payload: web::Json<LikeRequest>,
) -> Result<HttpResponse> {
    let service = LikeService::new((**pool).clone());
    let count = service
        .handle_comment_like(*comment_id, &user.username, payload.is_like)
        .await?;

    Ok(response::ok("Successful", count))
}

/// GET /api/v1/comments/{commentId}/likes
pub async fn comment_likers(
    pool: web::Data<PgPool>,
    comment_id: web::Path<Uuid>,
    filter: web::Query<Filter>,
) -> Result<HttpResponse> {
    let service = LikeService::new((**pool).clone());
    let page = service
        .get_users_who_liked_comment(*comment_id, &filter)
        .await?;

    Ok(response::ok(
        "Users who liked the comment fetched successfully",
        page,
    ))
}
