//! Query functions for attendances.

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::db::schema::attendances;
use crate::model::attendance::{Attendance, NewAttendance};

pub type BoxedQuery<'a> = attendances::BoxedQuery<'a, Pg>;

/// ## Summary
/// Returns a query to select all attendances.
#[must_use]
pub fn all() -> BoxedQuery<'static> {
    attendances::table.into_boxed()
}

/// ## Summary
/// Returns a query to find an attendance by ID.
#[must_use]
pub fn by_id(id: i32) -> BoxedQuery<'static> {
    all().filter(attendances::id.eq(id))
}

/// ## Summary
/// Returns a query to find the attendance of a user for an event.
#[must_use]
pub fn by_user_and_event(user_id: i32, event_id: i32) -> BoxedQuery<'static> {
    all()
        .filter(attendances::user_id.eq(user_id))
        .filter(attendances::event_id.eq(event_id))
}

/// Composable attendance scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub user_id: Option<i32>,
    pub event_id: Option<i32>,
    pub confirmed: Option<bool>,
}

impl AttendanceFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_user(mut self, user_id: i32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn for_event(mut self, event_id: i32) -> Self {
        self.event_id = Some(event_id);
        self
    }

    #[must_use]
    pub fn confirmed(mut self) -> Self {
        self.confirmed = Some(true);
        self
    }

    #[must_use]
    pub fn unconfirmed(mut self) -> Self {
        self.confirmed = Some(false);
        self
    }

    #[must_use]
    pub fn into_query(self) -> BoxedQuery<'static> {
        let mut query = all();

        if let Some(user_id) = self.user_id {
            query = query.filter(attendances::user_id.eq(user_id));
        }
        if let Some(event_id) = self.event_id {
            query = query.filter(attendances::event_id.eq(event_id));
        }
        if let Some(confirmed) = self.confirmed {
            query = query.filter(attendances::confirmed.eq(confirmed));
        }

        query.order(attendances::id.asc())
    }
}

/// ## Summary
/// Inserts a new attendance and returns the inserted record.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_attendance(
    conn: &mut AsyncPgConnection,
    new_attendance: &NewAttendance,
) -> QueryResult<Attendance> {
    diesel::insert_into(attendances::table)
        .values(new_attendance)
        .returning(Attendance::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Overwrites an attendance and returns the updated record.
///
/// ## Errors
/// Returns a database error if the update fails, `NotFound` if no row has `id`.
pub async fn update_attendance(
    conn: &mut AsyncPgConnection,
    id: i32,
    changes: &NewAttendance,
) -> QueryResult<Attendance> {
    diesel::update(attendances::table.find(id))
        .set(changes)
        .returning(Attendance::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes an attendance, returning the number of rows removed.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_attendance(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(attendances::table.find(id))
        .execute(conn)
        .await
}

/// ## Summary
/// Retrieves an attendance by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_attendance(
    conn: &mut AsyncPgConnection,
    id: i32,
) -> QueryResult<Option<Attendance>> {
    by_id(id).first::<Attendance>(conn).await.optional()
}

/// ## Summary
/// Checks whether `user_id` already has an attendance for `event_id`, other
/// than `except_id`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn pair_taken(
    conn: &mut AsyncPgConnection,
    user_id: i32,
    event_id: i32,
    except_id: Option<i32>,
) -> QueryResult<bool> {
    let mut query = by_user_and_event(user_id, event_id);
    if let Some(id) = except_id {
        query = query.filter(attendances::id.ne(id));
    }

    query
        .select(attendances::id)
        .first::<i32>(conn)
        .await
        .optional()
        .map(|found| found.is_some())
}

/// ## Summary
/// Loads every attendance matching the filter.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn load_attendances(
    conn: &mut AsyncPgConnection,
    filter: AttendanceFilter,
) -> QueryResult<Vec<Attendance>> {
    filter.into_query().load::<Attendance>(conn).await
}
