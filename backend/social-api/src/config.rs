/// Configuration management for the Social API
///
/// All settings come from environment variables, with development defaults
/// for everything except the JWT signing key, which must always be provided.
use credential_core::TokenConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: TokenConfig,
    /// Social-graph limits
    pub limits: LimitsConfig,
    /// Media storage configuration
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Social-graph limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Friend requests one account may send in a rolling 24-hour window
    pub daily_friend_request_limit: i64,
}

/// Media storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// S3 bucket receiving uploads
    pub bucket: String,
    /// Base URL under which uploaded objects are publicly reachable
    pub public_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("SOCIAL_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("SOCIAL_API_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/ripple".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            jwt: TokenConfig {
                signing_key: std::env::var("JWT_SIGNING_KEY")
                    .map_err(|_| "JWT_SIGNING_KEY must be set".to_string())?,
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ripple".to_string()),
                audience: std::env::var("JWT_AUDIENCE")
                    .unwrap_or_else(|_| "ripple-api".to_string()),
                access_token_ttl_minutes: std::env::var("JWT_ACCESS_TOKEN_TTL_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
                refresh_token_ttl_minutes: std::env::var("JWT_REFRESH_TOKEN_TTL_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60 * 24 * 7),
            },
            limits: LimitsConfig {
                daily_friend_request_limit: std::env::var("DAILY_FRIEND_REQUEST_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(50),
            },
            media: MediaConfig {
                bucket: std::env::var("MEDIA_BUCKET").unwrap_or_else(|_| "ripple-media".to_string()),
                public_base_url: std::env::var("MEDIA_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "https://media.ripple.local".to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize the tests touching them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn from_env_uses_defaults_in_development() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("APP_ENV");
        std::env::remove_var("CORS_ALLOWED_ORIGINS");
        std::env::set_var("JWT_SIGNING_KEY", "test-key");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.limits.daily_friend_request_limit, 50);
        assert_eq!(config.jwt.access_token_ttl_minutes, 15);

        std::env::remove_var("JWT_SIGNING_KEY");
    }

    #[test]
    fn from_env_requires_signing_key() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("JWT_SIGNING_KEY");
        assert!(Config::from_env().is_err());
    }
}
