//! Query functions for users.

use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::db::enums::AuthProvider;
use crate::db::schema::{attendances, users};
use crate::model::user::{NewUser, User};

pub type BoxedQuery<'a> = users::BoxedQuery<'a, Pg>;

/// ## Summary
/// Returns a query to select all users.
#[must_use]
pub fn all() -> BoxedQuery<'static> {
    users::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a user by ID.
#[must_use]
pub fn by_id(id: i32) -> BoxedQuery<'static> {
    all().filter(users::id.eq(id))
}

/// ## Summary
/// Returns a query to find a user by provider identity.
#[must_use]
pub fn by_identity(provider: AuthProvider, uid: &str) -> BoxedQuery<'_> {
    all()
        .filter(users::provider.eq(provider))
        .filter(users::uid.eq(uid))
}

/// Whether a user's provider token is still usable at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// `oauth_expires_at <= now`
    Expired,
    /// `oauth_expires_at > now`
    Active,
}

/// Composable user scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub session: Option<(SessionState, DateTime<Utc>)>,
    pub attending_event: Option<i32>,
    pub alphabetical: bool,
}

impl UserFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Order by last name, then first name.
    #[must_use]
    pub fn alphabetical(mut self) -> Self {
        self.alphabetical = true;
        self
    }

    #[must_use]
    pub fn expired(mut self, now: DateTime<Utc>) -> Self {
        self.session = Some((SessionState::Expired, now));
        self
    }

    #[must_use]
    pub fn session_active(mut self, now: DateTime<Utc>) -> Self {
        self.session = Some((SessionState::Active, now));
        self
    }

    /// Users holding an attendance for `event_id`, confirmed or not.
    #[must_use]
    pub fn attending(mut self, event_id: i32) -> Self {
        self.attending_event = Some(event_id);
        self
    }

    #[must_use]
    pub fn into_query(self) -> BoxedQuery<'static> {
        let mut query = all();

        match self.session {
            Some((SessionState::Expired, now)) => {
                query = query.filter(users::oauth_expires_at.le(now));
            }
            Some((SessionState::Active, now)) => {
                query = query.filter(users::oauth_expires_at.gt(now));
            }
            None => {}
        }

        if let Some(event_id) = self.attending_event {
            query = query.filter(
                users::id.eq_any(
                    attendances::table
                        .filter(attendances::event_id.eq(event_id))
                        .select(attendances::user_id),
                ),
            );
        }

        if self.alphabetical {
            query = query.order((users::last_name.asc(), users::first_name.asc()));
        } else {
            query = query.order(users::id.asc());
        }

        query
    }
}

/// ## Summary
/// Inserts a user, or overwrites names, token and expiry of the user with
/// the same `(provider, uid)`.
///
/// ## Errors
/// Returns a database error if the statement fails.
pub async fn upsert_user(
    conn: &mut AsyncPgConnection,
    new_user: &NewUser<'_>,
) -> QueryResult<User> {
    diesel::insert_into(users::table)
        .values(new_user)
        .on_conflict((users::provider, users::uid))
        .do_update()
        .set(new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Retrieves a user by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_user(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<User>> {
    by_id(id).first::<User>(conn).await.optional()
}

/// ## Summary
/// Retrieves a user by provider identity.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_identity(
    conn: &mut AsyncPgConnection,
    provider: AuthProvider,
    uid: &str,
) -> QueryResult<Option<User>> {
    by_identity(provider, uid)
        .first::<User>(conn)
        .await
        .optional()
}

/// ## Summary
/// Checks whether a user row exists, without loading it.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn user_exists(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(users::table.filter(users::id.eq(id))))
        .get_result(conn)
        .await
}

/// ## Summary
/// Loads every user matching the filter.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn load_users(
    conn: &mut AsyncPgConnection,
    filter: UserFilter,
) -> QueryResult<Vec<User>> {
    filter.into_query().load::<User>(conn).await
}

/// ## Summary
/// Counts all users.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_users(conn: &mut AsyncPgConnection) -> QueryResult<i64> {
    users::table.count().get_result(conn).await
}
