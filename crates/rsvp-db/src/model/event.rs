use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use crate::model::{category::Category, user::User};

#[derive(
    Debug, Clone, PartialEq, Identifiable, Queryable, Selectable, Associations,
)]
#[diesel(table_name = schema::events)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(belongs_to(Category, foreign_key = category_id))]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub active: bool,
    /// Creator.
    pub user_id: i32,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event's window contains `now`. An open-ended event stays
    /// current once it has started.
    #[must_use]
    pub fn is_current_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && self.end_time.is_none_or(|end| now <= end)
    }
}

/// Insert struct; also the changeset for a full revalidated update.
///
/// `treat_none_as_null` so clearing `end_time` or a coordinate on update
/// writes NULL instead of skipping the column.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = schema::events)]
#[diesel(treat_none_as_null = true)]
pub struct NewEvent<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub active: bool,
    pub user_id: i32,
    pub category_id: i32,
}
