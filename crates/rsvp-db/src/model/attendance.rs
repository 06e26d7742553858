use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use crate::model::{event::Event, user::User};

/// A user's RSVP for an event.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Associations,
)]
#[diesel(table_name = schema::attendances)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(belongs_to(Event, foreign_key = event_id))]
pub struct Attendance {
    pub id: i32,
    pub user_id: i32,
    pub event_id: i32,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = schema::attendances)]
pub struct NewAttendance {
    pub user_id: i32,
    pub event_id: i32,
    pub confirmed: bool,
}
