//! Query functions for events.

use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::db::schema::{attendances, events};
use crate::model::event::{Event, NewEvent};

pub type BoxedQuery<'a> = events::BoxedQuery<'a, Pg>;

/// ## Summary
/// Returns a query to select all events.
#[must_use]
pub fn all() -> BoxedQuery<'static> {
    events::table.into_boxed()
}

/// ## Summary
/// Returns a query to find an event by ID.
#[must_use]
pub fn by_id(id: i32) -> BoxedQuery<'static> {
    all().filter(events::id.eq(id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrder {
    StartTime,
    /// Open-ended events (no end time) come first.
    EndTime,
}

/// Composable event scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub creator_id: Option<i32>,
    pub category_id: Option<i32>,
    pub attended_by: Option<i32>,
    pub active: Option<bool>,
    pub current_at: Option<DateTime<Utc>>,
    pub order: Option<EventOrder>,
}

impl EventFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_creator(mut self, user_id: i32) -> Self {
        self.creator_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn for_category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Events `user_id` holds an attendance for.
    #[must_use]
    pub fn attended_by(mut self, user_id: i32) -> Self {
        self.attended_by = Some(user_id);
        self
    }

    #[must_use]
    pub fn active(mut self) -> Self {
        self.active = Some(true);
        self
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = Some(false);
        self
    }

    /// Events whose window contains `now`:
    /// `start_time <= now AND (end_time IS NULL OR now <= end_time)`.
    #[must_use]
    pub fn current(mut self, now: DateTime<Utc>) -> Self {
        self.current_at = Some(now);
        self
    }

    #[must_use]
    pub fn by_start_time(mut self) -> Self {
        self.order = Some(EventOrder::StartTime);
        self
    }

    #[must_use]
    pub fn by_end_time(mut self) -> Self {
        self.order = Some(EventOrder::EndTime);
        self
    }

    #[must_use]
    pub fn into_query(self) -> BoxedQuery<'static> {
        let mut query = all();

        if let Some(user_id) = self.creator_id {
            query = query.filter(events::user_id.eq(user_id));
        }
        if let Some(category_id) = self.category_id {
            query = query.filter(events::category_id.eq(category_id));
        }
        if let Some(user_id) = self.attended_by {
            query = query.filter(
                events::id.eq_any(
                    attendances::table
                        .filter(attendances::user_id.eq(user_id))
                        .select(attendances::event_id),
                ),
            );
        }
        if let Some(active) = self.active {
            query = query.filter(events::active.eq(active));
        }
        if let Some(now) = self.current_at {
            query = query
                .filter(events::start_time.le(now))
                .filter(events::end_time.is_null().or(events::end_time.ge(now)));
        }

        query = match self.order {
            Some(EventOrder::StartTime) => query
                .order(events::start_time.asc())
                .then_order_by(events::id.asc()),
            Some(EventOrder::EndTime) => query
                .order(events::end_time.asc().nulls_first())
                .then_order_by(events::id.asc()),
            None => query.order(events::id.asc()),
        };

        query
    }
}

/// ## Summary
/// Inserts a new event and returns the inserted record.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_event(
    conn: &mut AsyncPgConnection,
    new_event: &NewEvent<'_>,
) -> QueryResult<Event> {
    diesel::insert_into(events::table)
        .values(new_event)
        .returning(Event::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Overwrites every editable column of an event.
///
/// ## Errors
/// Returns a database error if the update fails, `NotFound` if no row has `id`.
pub async fn update_event(
    conn: &mut AsyncPgConnection,
    id: i32,
    changes: &NewEvent<'_>,
) -> QueryResult<Event> {
    diesel::update(events::table.find(id))
        .set(changes)
        .returning(Event::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes an event. Attendances are not touched, so an event that still has
/// attendances is refused by the foreign key.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_event(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(events::table.find(id)).execute(conn).await
}

/// ## Summary
/// Retrieves an event by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_event(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Event>> {
    by_id(id).first::<Event>(conn).await.optional()
}

/// ## Summary
/// Reads only the `active` flag of an event; `None` when it does not exist.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn event_active(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<bool>> {
    events::table
        .find(id)
        .select(events::active)
        .first::<bool>(conn)
        .await
        .optional()
}

/// ## Summary
/// Loads every event matching the filter.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn load_events(
    conn: &mut AsyncPgConnection,
    filter: EventFilter,
) -> QueryResult<Vec<Event>> {
    filter.into_query().load::<Event>(conn).await
}

/// ## Summary
/// Counts all events.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_events(conn: &mut AsyncPgConnection) -> QueryResult<i64> {
    events::table.count().get_result(conn).await
}
