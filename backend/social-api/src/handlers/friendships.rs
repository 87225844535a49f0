/// Follower/following listings and unfollow.
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::pagination::Filter;
use crate::response;
use crate::services::FriendshipService;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

/// GET /api/v1/friendships/followers/{username}
pub async fn get_followers(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    filter: web::Query<Filter>,
) -> Result<HttpResponse> {
    let service = FriendshipService::new((**pool).clone());
    let page = service.get_user_followers(&username, &filter).await?;

    Ok(response::ok("User followers fetched successfully", page))
}

/// GET /api/v1/friendships/followings/{username}
pub async fn get_following(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
    filter: web::Query<Filter>,
) -> Result<HttpResponse> {
    let service = FriendshipService::new((**pool).clone());
    let page = service.get_user_following(&username, &filter).await?;

    Ok(response::ok("User followings fetched successfully", page))
}

/// DELETE /api/v1/friendships/unfollow/{followeeUsername}
pub async fn unfollow(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    followee_username: web::Path<String>,
) -> Result<HttpResponse> {
    let service = FriendshipService::new((**pool).clone());
    service
        .unfollow_user(&user.username, &followee_username)
        .await?;

    Ok(response::ok("User unfollowed successfully", true))
}
