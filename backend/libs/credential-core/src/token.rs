/// JWT access tokens and opaque refresh tokens
///
/// Access tokens are signed with HS256 and carry the username as subject
/// plus a unique token id. Refresh tokens are opaque random values whose
/// state lives in the accounts table, not in the token itself.
///
/// Keys are held by an explicit [`TokenIssuer`] constructed at startup and
/// passed to the components that need it; there is no global key state.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Refresh token length in bytes, before base64 encoding
const REFRESH_TOKEN_SIZE: usize = 64;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Any validation failure: bad signature, wrong issuer/audience,
    /// malformed token, expired token. Deliberately carries no detail so the
    /// caller cannot become a token oracle.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token signing failed")]
    Signing,
}

/// JWT signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub signing_key: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_minutes: i64,
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username
    pub sub: String,
    /// Unique token id
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Issues and validates access tokens for one signing-key configuration.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: TokenConfig,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            config,
        }
    }

    /// How long persisted refresh tokens stay valid.
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::minutes(self.config.refresh_token_ttl_minutes)
    }

    /// Generate a signed access token for `username`.
    pub fn generate_access_token(&self, username: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires = now + Duration::minutes(self.config.access_token_ttl_minutes);

        let claims = Claims {
            sub: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Validate a token fully: signature, issuer, audience and expiry.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = self.validation(true);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidToken)
    }

    /// Decode a possibly expired token, still enforcing signature, issuer,
    /// audience and algorithm. Used by the refresh flow, where the access
    /// token is allowed to be past its expiry.
    pub fn decode_expired_token(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = self.validation(false);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidToken)
    }

    fn validation(&self, validate_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = validate_exp;
        validation.leeway = 0;
        validation
    }
}

/// Generate an opaque refresh token: 64 random bytes, base64-encoded.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_SIZE];
    OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(access_ttl_minutes: i64) -> TokenConfig {
        TokenConfig {
            signing_key: "unit-test-signing-key-0123456789".to_string(),
            issuer: "ripple".to_string(),
            audience: "ripple-api".to_string(),
            access_token_ttl_minutes: access_ttl_minutes,
            refresh_token_ttl_minutes: 60 * 24,
        }
    }

    #[test]
    fn access_token_round_trip_recovers_username() {
        let issuer = TokenIssuer::new(test_config(15));
        let token = issuer.generate_access_token("ada").unwrap();

        let claims = issuer.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "ada");
        assert_eq!(claims.iss, "ripple");
        assert_eq!(claims.aud, "ripple-api");
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn expired_token_fails_validation_but_decodes_for_refresh() {
        // Negative TTL yields a token that is already expired.
        let issuer = TokenIssuer::new(test_config(-5));
        let token = issuer.generate_access_token("ada").unwrap();

        assert!(issuer.validate_token(&token).is_err());

        let claims = issuer.decode_expired_token(&token).unwrap();
        assert_eq!(claims.sub, "ada");
    }

    #[test]
    fn token_from_different_key_is_rejected() {
        let issuer = TokenIssuer::new(test_config(15));
        let mut other_config = test_config(15);
        other_config.signing_key = "another-signing-key-entirely".to_string();
        let other = TokenIssuer::new(other_config);

        let token = other.generate_access_token("ada").unwrap();
        assert!(issuer.validate_token(&token).is_err());
        assert!(issuer.decode_expired_token(&token).is_err());
    }

    #[test]
    fn wrong_audience_is_rejected_even_without_expiry_check() {
        let issuer = TokenIssuer::new(test_config(15));
        let mut other_config = test_config(15);
        other_config.audience = "somewhere-else".to_string();
        let other = TokenIssuer::new(other_config);

        let token = other.generate_access_token("ada").unwrap();
        assert!(issuer.decode_expired_token(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = TokenIssuer::new(test_config(15));
        let token = issuer.generate_access_token("ada").unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(issuer.validate_token(&tampered).is_err());
    }

    #[test]
    fn refresh_tokens_are_64_random_bytes() {
        let one = generate_refresh_token();
        let two = generate_refresh_token();
        assert_ne!(one, two);
        assert_eq!(BASE64.decode(&one).unwrap().len(), REFRESH_TOKEN_SIZE);
    }
}
