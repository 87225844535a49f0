/// Credential & token management: registration, login, token refresh and
/// refresh-token revocation.
use crate::error::{AppError, Result};
use crate::models::{Account, AccountStatus, PrivacyLevel};
use chrono::{DateTime, NaiveDate, Utc};
use credential_core::{password, token, TokenIssuer};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest {
    #[validate(length(min = 3, max = 30, message = "username must be 3-30 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 100, message = "full name is required"))]
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: Option<String>,
    #[validate(url(message = "profile picture must be a valid URL"))]
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: Arc<TokenIssuer>) -> Self {
        Self { pool, tokens }
    }

    /// Register a new account. Email and username must both be free.
    pub async fn register_account(
        &self,
        request: RegisterAccountRequest,
    ) -> Result<RegisteredAccount> {
        tracing::info!(username = %request.username, "Registering account");

        let existing = sqlx::query_as::<_, (String, String)>(
            "SELECT username, email FROM accounts WHERE email = $1 OR username = $2",
        )
        .bind(&request.email)
        .bind(&request.username)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((username, email)) = existing {
            if email == request.email {
                return Err(AppError::Conflict(
                    "Email is already registered. Please use a different email address."
                        .to_string(),
                ));
            }
            if username == request.username {
                return Err(AppError::Conflict(
                    "Username is already taken. Please choose a different username.".to_string(),
                ));
            }
        }

        let (hash, salt) = password::hash_password(&request.password);

        let created = sqlx::query_as::<_, (Uuid, String, String, String, DateTime<Utc>)>(
            r#"
            INSERT INTO accounts (
                id, username, email, phone_number, full_name, date_of_birth,
                bio, profile_picture_url, password_hash, password_salt,
                account_status, privacy_level
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, username, email, full_name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(&request.full_name)
        .bind(request.date_of_birth)
        .bind(&request.bio)
        .bind(&request.profile_picture_url)
        .bind(&hash)
        .bind(&salt)
        .bind(AccountStatus::Active.as_str())
        .bind(PrivacyLevel::Public.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_write(e, "We are unable to create the account at this moment. Please try again.")
        })?;

        let (id, username, email, full_name, created_at) = created;
        Ok(RegisteredAccount {
            id,
            username,
            email,
            full_name,
            created_at,
        })
    }

    /// Authenticate by email or username and issue an access/refresh pair.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        if request.email.is_none() && request.username.is_none() {
            return Err(AppError::BadRequest(
                "Provide an email or a username".to_string(),
            ));
        }

        let account = self
            .find_by_email_or_username(
                request.email.as_deref().unwrap_or(""),
                request.username.as_deref().unwrap_or(""),
            )
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !password::verify_password(
            &request.password,
            &account.password_hash,
            &account.password_salt,
        ) {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let access_token = self
            .tokens
            .generate_access_token(&account.username)
            .map_err(|_| AppError::Internal("token signing failed".to_string()))?;
        let refresh_token = token::generate_refresh_token();

        self.store_refresh_token(account.id, &refresh_token).await?;

        tracing::info!(username = %account.username, "Login successful");

        Ok(LoginResponse {
            email: account.email,
            access_token,
            refresh_token,
        })
    }

    /// Rotate an access/refresh pair.
    ///
    /// The access token may be expired; signature, issuer and audience are
    /// still enforced. The refresh token must match the stored one and be
    /// within its expiry.
    pub async fn refresh_token(&self, request: TokenRefreshRequest) -> Result<TokenResponse> {
        let claims = self
            .tokens
            .decode_expired_token(&request.access_token)
            .map_err(|_| {
                AppError::BadRequest("Invalid access token or refresh token".to_string())
            })?;

        let account = self
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Invalid access token or refresh token".to_string())
            })?;

        let stored_matches = account
            .refresh_token
            .as_deref()
            .map(|stored| stored == request.refresh_token)
            .unwrap_or(false);
        let still_valid = account
            .refresh_token_expires_at
            .map(|expires| expires > Utc::now())
            .unwrap_or(false);

        if !stored_matches || !still_valid {
            return Err(AppError::BadRequest(
                "Invalid access token or refresh token".to_string(),
            ));
        }

        let access_token = self
            .tokens
            .generate_access_token(&account.username)
            .map_err(|_| AppError::Internal("token signing failed".to_string()))?;
        let refresh_token = token::generate_refresh_token();

        self.store_refresh_token(account.id, &refresh_token).await?;

        tracing::info!(username = %account.username, "Issued new token pair");

        Ok(TokenResponse {
            access_token,
            refresh_token,
        })
    }

    /// Clear the stored refresh token for a user.
    pub async fn revoke_refresh_token(&self, username: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = NULL,
                refresh_token_added_at = NULL,
                refresh_token_expires_at = NULL
            WHERE username = $1
            "#,
        )
        .bind(username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() < 1 {
            return Err(AppError::BadRequest("Invalid user name".to_string()));
        }

        tracing::info!(username = %username, "Refresh token revoked");
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE email = $1 OR username = $2",
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn store_refresh_token(&self, account_id: Uuid, refresh_token: &str) -> Result<()> {
        let expires_at = Utc::now() + self.tokens.refresh_token_ttl();

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = $2,
                refresh_token_added_at = NOW(),
                refresh_token_expires_at = $3,
                last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(refresh_token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_write(
                e,
                "Something bad happened and it is entirely our fault. Please try again.",
            )
        })?;

        if result.rows_affected() < 1 {
            return Err(AppError::FailedDependency(
                "Something bad happened and it is entirely our fault. Please try again."
                    .to_string(),
            ));
        }

        Ok(())
    }
}
