use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::AuthProvider, schema};

/// A person who signed in through an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable)]
#[diesel(table_name = schema::users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
    pub id: i32,
    pub provider: AuthProvider,
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub oauth_token: String,
    pub oauth_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last"
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "Last, First", for listing by surname.
    #[must_use]
    pub fn sort_key(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Token expiry at or before `now`. A tie counts as expired.
    #[must_use]
    pub fn session_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.oauth_expires_at <= now
    }

    #[must_use]
    pub fn session_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.session_expired_at(now)
    }
}

/// Insert/upsert struct keyed on `(provider, uid)`.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = schema::users)]
pub struct NewUser<'a> {
    pub provider: AuthProvider,
    pub uid: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub oauth_token: &'a str,
    pub oauth_expires_at: DateTime<Utc>,
}
