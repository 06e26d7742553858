//! Users are only ever written through a successful external sign-in.

use chrono::{DateTime, Utc};
use diesel_async::AsyncPgConnection;
use serde::Deserialize;

use rsvp_core::validation::{BLANK, ValidationErrors};
use rsvp_db::db::enums::AuthProvider;
use rsvp_db::db::query::user::{self as query, UserFilter};
use rsvp_db::model::user::{NewUser, User};

use crate::error::{ServiceError, ServiceResult};

pub const NOT_ALLOWED_PROVIDER: &str = "is not included in the list";

/// Profile handed back by the identity provider after a sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalProfile {
    pub provider: String,
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub token: String,
    /// Seconds since the epoch on the wire.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

/// ## Summary
/// Checks a profile against the user rules and maps it onto an upsert row.
///
/// ## Errors
/// Returns every failed field when a value is blank or the provider is
/// outside the allowed set.
pub fn validate_profile(profile: &ExternalProfile) -> Result<NewUser<'_>, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let provider = if profile.provider.trim().is_empty() {
        errors.add("provider", BLANK);
        None
    } else {
        profile
            .provider
            .parse::<AuthProvider>()
            .inspect_err(|_| errors.add("provider", NOT_ALLOWED_PROVIDER))
            .ok()
    };
    let uid = errors.require_text("uid", Some(profile.uid.as_str()));
    let first_name = errors.require_text("first_name", Some(profile.first_name.as_str()));
    let last_name = errors.require_text("last_name", Some(profile.last_name.as_str()));
    let oauth_token = errors.require_text("oauth_token", Some(profile.token.as_str()));

    match (provider, uid, first_name, last_name, oauth_token) {
        (Some(provider), Some(uid), Some(first_name), Some(last_name), Some(oauth_token)) => {
            errors.into_result(NewUser {
                provider,
                uid,
                first_name,
                last_name,
                oauth_token,
                oauth_expires_at: profile.expires_at,
            })
        }
        _ => Err(errors),
    }
}

/// ## Summary
/// Creates the user identified by `(provider, uid)` or refreshes its names,
/// token and expiry. Calling it again with the same identity never adds a
/// second row.
///
/// ## Errors
/// Returns `Validation` if the profile breaks a user rule and `Persistence`
/// if the store rejects the write.
#[tracing::instrument(skip(conn, profile), fields(provider = %profile.provider, uid = %profile.uid))]
pub async fn upsert_from_external_auth(
    conn: &mut AsyncPgConnection,
    profile: &ExternalProfile,
) -> ServiceResult<User> {
    let new_user = validate_profile(profile)
        .inspect_err(|errors| tracing::warn!(%errors, "Rejected external profile"))?;

    let user = query::upsert_user(conn, &new_user).await?;

    tracing::info!(user_id = user.id, "User signed in");
    Ok(user)
}

/// ## Summary
/// Fetches a user by ID.
///
/// ## Errors
/// Returns `NotFound` if no user has `id`.
#[tracing::instrument(skip(conn))]
pub async fn get_user(conn: &mut AsyncPgConnection, id: i32) -> ServiceResult<User> {
    query::get_user(conn, id)
        .await?
        .ok_or(ServiceError::NotFound { entity: "user", id })
}

/// ## Summary
/// Lists users matching the filter.
///
/// ## Errors
/// Returns `Persistence` if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn list_users(
    conn: &mut AsyncPgConnection,
    filter: UserFilter,
) -> ServiceResult<Vec<User>> {
    Ok(query::load_users(conn, filter).await?)
}
