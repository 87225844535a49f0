/// Friend-request handlers.
use crate::config::Config;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::pagination::Filter;
use crate::response;
use crate::services::friend_requests::RequestDirection;
use crate::services::FriendRequestService;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestBody {
    pub receiver_username: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectionQuery {
    /// true lists requests the caller sent, false those they received.
    pub sent: bool,
}

fn service(pool: &web::Data<PgPool>, config: &web::Data<Config>) -> FriendRequestService {
    FriendRequestService::new(
        (***pool).clone(),
        config.limits.daily_friend_request_limit,
    )
}

/// POST /api/v1/friend-requests
pub async fn send(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthenticatedUser,
    payload: web::Json<SendFriendRequestBody>,
) -> Result<HttpResponse> {
    service(&pool, &config)
        .send_friend_request(&user.username, &payload.receiver_username)
        .await?;

    Ok(response::message(
        StatusCode::CREATED,
        "Friend request sent successfully",
    ))
}

/// GET /api/v1/friend-requests?sent=...&pageNumber=...&pageSize=...
pub async fn list(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthenticatedUser,
    filter: web::Query<Filter>,
    direction: web::Query<DirectionQuery>,
) -> Result<HttpResponse> {
    let direction = if direction.sent {
        RequestDirection::Sent
    } else {
        RequestDirection::Received
    };

    let page = service(&pool, &config)
        .get_friend_requests(&user.username, &filter, direction)
        .await?;

    Ok(response::ok("Friend requests fetched successfully", page))
}

/// POST /api/v1/friend-requests/{requestId}/approve
pub async fn approve(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthenticatedUser,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service(&pool, &config)
        .approve_friend_request(*request_id, &user.username)
        .await?;

    Ok(response::ok("Friend request approved successfully", true))
}

/// POST /api/v1/friend-requests/{requestId}/reject
pub async fn reject(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthenticatedUser,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service(&pool, &config)
        .reject_friend_request(*request_id, &user.username)
        .await?;

    Ok(response::ok("Friend request rejected successfully", true))
}
