/// Post handlers.
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::pagination::Filter;
use crate::response;
use crate::services::posts::PostRequest;
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /api/v1/posts
pub async fn create_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let service = PostService::new((**pool).clone());
    let post = service
        .create_post(&user.username, payload.into_inner())
        .await?;

    Ok(response::created("Post created successfully", post))
}

/// GET /api/v1/posts
pub async fn get_own_posts(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    filter: web::Query<Filter>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let page = service.get_user_posts(&user.username, &filter).await?;

    Ok(response::ok("User posts fetched successfully", page))
}

/// GET /api/v1/posts/{postId}
pub async fn get_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.get_user_post(&user.username, *post_id).await?;

    Ok(response::ok("User post fetched successfully", post))
}

/// PUT /api/v1/posts/{postId}
pub async fn update_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    payload: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let service = PostService::new((**pool).clone());
    let post = service
        .update_post(&user.username, *post_id, payload.into_inner())
        .await?;

    Ok(response::ok("Post updated successfully", post))
}

/// DELETE /api/v1/posts/{postId}
pub async fn delete_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    service.delete_post(&user.username, *post_id).await?;

    Ok(response::ok("Post deleted successfully", true))
}
