/// Auth handlers: registration, login, token refresh, token revocation.
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::response;
use crate::services::auth::{LoginRequest, RegisterAccountRequest, TokenRefreshRequest};
use crate::services::AuthService;
use actix_web::{web, HttpResponse};
use credential_core::TokenIssuer;
use sqlx::PgPool;
use validator::Validate;

/// POST /api/v1/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenIssuer>,
    payload: web::Json<RegisterAccountRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let service = AuthService::new((**pool).clone(), tokens.clone().into_inner());
    let account = service.register_account(payload.into_inner()).await?;

    Ok(response::created("Account created successfully.", account))
}

/// POST /api/v1/auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenIssuer>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let service = AuthService::new((**pool).clone(), tokens.clone().into_inner());
    let login = service.login(payload.into_inner()).await?;

    Ok(response::ok("Login successful.", login))
}

/// POST /api/v1/auth/token/refresh
pub async fn refresh_token(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenIssuer>,
    payload: web::Json<TokenRefreshRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), tokens.clone().into_inner());
    let pair = service.refresh_token(payload.into_inner()).await?;

    Ok(response::ok("New tokens generated successfully", pair))
}

/// DELETE /api/v1/auth/token/revoke
pub async fn revoke_token(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenIssuer>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone(), tokens.clone().into_inner());
    service.revoke_refresh_token(&user.username).await?;

    Ok(response::ok("Refresh token revoked successfully.", true))
}
