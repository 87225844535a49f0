/// Profile handlers.
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::response;
use crate::services::profiles::UpdateProfileRequest;
use crate::services::ProfileService;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

/// GET /api/v1/profiles
pub async fn get_own_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let service = ProfileService::new((**pool).clone());
    let profile = service.get_user_profile(&user.username).await?;

    Ok(response::ok("User profile retrieved successfully", profile))
}

/// GET /api/v1/profiles/{username}
pub async fn get_profile(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let service = ProfileService::new((**pool).clone());
    let profile = service.get_user_profile(&username).await?;

    Ok(response::ok("User profile retrieved successfully", profile))
}

/// PUT /api/v1/profiles
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let service = ProfileService::new((**pool).clone());
    let profile = service
        .update_user_profile(&user.username, payload.into_inner())
        .await?;

    Ok(response::ok(
        "Your profile has been updated successfully",
        profile,
    ))
}
