/// Profile reads and field-level profile merges.
use crate::error::{AppError, Result};
use crate::models::{Account, ExternalLink, LanguagePreference, Location};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "full name must be 1-100 characters"))]
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(url(message = "profile picture must be a valid URL"))]
    pub profile_picture_url: Option<String>,
    pub language_preferences: Option<Vec<LanguagePreference>>,
    pub external_links: Option<Vec<ExternalLink>>,
    pub location: Option<Location>,
}

/// Public-safe profile view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub privacy_level: String,
    pub is_verified: bool,
    pub total_posts: i32,
    pub total_followers: i32,
    pub total_following: i32,
    pub language_preferences: Vec<LanguagePreference>,
    pub external_links: Vec<ExternalLink>,
    pub location: Location,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl From<Account> for ProfileResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            phone_number: account.phone_number,
            full_name: account.full_name,
            date_of_birth: account.date_of_birth,
            bio: account.bio,
            profile_picture_url: account.profile_picture_url,
            privacy_level: account.privacy_level,
            is_verified: account.is_verified,
            total_posts: account.total_posts,
            total_followers: account.total_followers,
            total_following: account.total_following,
            language_preferences: account.language_preferences.0,
            external_links: account.external_links.0,
            location: account.location.0,
            created_at: account.created_at,
            last_activity_at: account.last_activity_at,
        }
    }
}

/// Reconcile language preferences against a patch set, keyed by language.
///
/// Existing entries absent from the patch are removed; patch entries not yet
/// present are appended. Kept entries preserve their stored value.
pub fn reconcile_languages(
    existing: &[LanguagePreference],
    patch: &[LanguagePreference],
) -> Vec<LanguagePreference> {
    let mut merged: Vec<LanguagePreference> = existing
        .iter()
        .filter(|lp| patch.iter().any(|p| p.language == lp.language))
        .cloned()
        .collect();

    for new_lp in patch {
        if !merged.iter().any(|lp| lp.language == new_lp.language) {
            merged.push(new_lp.clone());
        }
    }

    merged
}

/// Reconcile external links against a patch set, keyed by link name.
pub fn reconcile_links(existing: &[ExternalLink], patch: &[ExternalLink]) -> Vec<ExternalLink> {
    let mut merged: Vec<ExternalLink> = existing
        .iter()
        .filter(|link| patch.iter().any(|p| p.name == link.name))
        .cloned()
        .collect();

    for new_link in patch {
        if !merged.iter().any(|link| link.name == new_link.name) {
            merged.push(new_link.clone());
        }
    }

    merged
}

pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Profile of an Active, non-suspended account.
    pub async fn get_user_profile(&self, username: &str) -> Result<ProfileResponse> {
        let account = self.active_account(username).await?;
        Ok(account.into())
    }

    /// Field-level merge of a profile patch: each present field overwrites
    /// the stored value; language preferences and external links reconcile
    /// as sets. Stamps last_activity_at.
    pub async fn update_user_profile(
        &self,
        username: &str,
        patch: UpdateProfileRequest,
    ) -> Result<ProfileResponse> {
        let account = self.active_account(username).await?;

        let email = patch.email.unwrap_or(account.email);
        let full_name = patch.full_name.unwrap_or(account.full_name);
        let phone_number = patch.phone_number.or(account.phone_number);
        let date_of_birth = patch.date_of_birth.or(account.date_of_birth);
        let bio = patch.bio.or(account.bio);
        let profile_picture_url = patch.profile_picture_url.or(account.profile_picture_url);
        let location = patch.location.unwrap_or(account.location.0);

        let language_preferences = match patch.language_preferences {
            Some(ref languages) => reconcile_languages(&account.language_preferences.0, languages),
            None => account.language_preferences.0,
        };
        let external_links = match patch.external_links {
            Some(ref links) => reconcile_links(&account.external_links.0, links),
            None => account.external_links.0,
        };

        let updated = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET email = $2,
                full_name = $3,
                phone_number = $4,
                date_of_birth = $5,
                bio = $6,
                profile_picture_url = $7,
                language_preferences = $8,
                external_links = $9,
                location = $10,
                last_activity_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(account.id)
        .bind(&email)
        .bind(&full_name)
        .bind(&phone_number)
        .bind(date_of_birth)
        .bind(&bio)
        .bind(&profile_picture_url)
        .bind(Json(&language_preferences))
        .bind(Json(&external_links))
        .bind(Json(&location))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_write(
                e,
                "Something bad happened and it is entirely our fault. Please try again.",
            )
        })?;

        tracing::info!(username = %username, "Profile updated");
        Ok(updated.into())
    }

    async fn active_account(&self, username: &str) -> Result<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE username = $1 AND is_suspended = FALSE AND account_status = 'Active'
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("User does not exist, check username and try again".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lp(language: &str) -> LanguagePreference {
        LanguagePreference {
            language: language.to_string(),
        }
    }

    fn link(name: &str, url: &str) -> ExternalLink {
        ExternalLink {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn languages_absent_from_patch_are_removed() {
        let existing = vec![lp("en"), lp("fr")];
        let patch = vec![lp("en")];
        assert_eq!(reconcile_languages(&existing, &patch), vec![lp("en")]);
    }

    #[test]
    fn new_languages_are_appended() {
        let existing = vec![lp("en")];
        let patch = vec![lp("en"), lp("de")];
        assert_eq!(
            reconcile_languages(&existing, &patch),
            vec![lp("en"), lp("de")]
        );
    }

    #[test]
    fn empty_patch_set_clears_languages() {
        let existing = vec![lp("en"), lp("fr")];
        assert!(reconcile_languages(&existing, &[]).is_empty());
    }

    #[test]
    fn kept_links_preserve_their_stored_url() {
        let existing = vec![link("website", "https://old.example")];
        let patch = vec![link("website", "https://new.example"), link("blog", "https://blog.example")];

        let merged = reconcile_links(&existing, &patch);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], link("website", "https://old.example"));
        assert_eq!(merged[1], link("blog", "https://blog.example"));
    }

    #[test]
    fn links_absent_from_patch_are_removed() {
        let existing = vec![link("website", "https://a.example"), link("blog", "https://b.example")];
        let patch = vec![link("blog", "https://b.example")];

        let merged = reconcile_links(&existing, &patch);
        assert_eq!(merged, vec![link("blog", "https://b.example")]);
    }
}
