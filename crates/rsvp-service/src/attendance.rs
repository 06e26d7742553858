use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use serde::Deserialize;

use rsvp_core::validation::ValidationErrors;
use rsvp_db::db::query::attendance::{self as query, AttendanceFilter};
use rsvp_db::db::query::event as event_query;
use rsvp_db::db::query::user as user_query;
use rsvp_db::model::attendance::{Attendance, NewAttendance};

use crate::error::{ServiceError, ServiceResult};

pub const USER_UNKNOWN: &str = "is not recognized by the system";
pub const EVENT_INACTIVE: &str = "is not active in the system";
pub const ALREADY_RECORDED: &str = "has already been recorded for this user";

/// Unvalidated attendance input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AttendanceDraft {
    pub user_id: Option<i32>,
    pub event_id: Option<i32>,
    pub confirmed: Option<bool>,
}

impl AttendanceDraft {
    #[must_use]
    pub const fn new(user_id: i32, event_id: i32, confirmed: bool) -> Self {
        Self {
            user_id: Some(user_id),
            event_id: Some(event_id),
            confirmed: Some(confirmed),
        }
    }
}

impl From<&Attendance> for AttendanceDraft {
    fn from(attendance: &Attendance) -> Self {
        Self::new(attendance.user_id, attendance.event_id, attendance.confirmed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceReferences {
    pub user_exists: bool,
    /// `None` when the event does not exist.
    pub event_active: Option<bool>,
    /// Another attendance already links the same user and event.
    pub pair_taken: bool,
}

/// ## Summary
/// Applies the attendance rules.
///
/// ## Errors
/// Returns every failed field.
pub fn validate_attendance(
    draft: AttendanceDraft,
    references: AttendanceReferences,
) -> Result<NewAttendance, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let user_id = errors.require_id("user_id", draft.user_id);
    let event_id = errors.require_id("event_id", draft.event_id);
    let confirmed = errors.require_flag("confirmed", draft.confirmed);

    if user_id.is_some() && !references.user_exists {
        errors.add("user", USER_UNKNOWN);
    }
    if event_id.is_some() && references.event_active != Some(true) {
        errors.add("event", EVENT_INACTIVE);
    }
    if references.pair_taken {
        errors.add("event", ALREADY_RECORDED);
    }

    match (user_id, event_id, confirmed) {
        (Some(user_id), Some(event_id), Some(confirmed)) => {
            errors.into_result(NewAttendance {
                user_id,
                event_id,
                confirmed,
            })
        }
        _ => Err(errors),
    }
}

async fn load_references(
    conn: &mut AsyncPgConnection,
    draft: AttendanceDraft,
    except_id: Option<i32>,
) -> ServiceResult<AttendanceReferences> {
    let user_id = draft.user_id.filter(|id| *id > 0);
    let event_id = draft.event_id.filter(|id| *id > 0);

    let user_exists = match user_id {
        Some(id) => user_query::user_exists(conn, id).await?,
        None => false,
    };
    let event_active = match event_id {
        Some(id) => event_query::event_active(conn, id).await?,
        None => None,
    };
    let pair_taken = match user_id.zip(event_id) {
        Some((user_id, event_id)) => query::pair_taken(conn, user_id, event_id, except_id).await?,
        None => false,
    };

    tracing::debug!(
        user_exists,
        ?event_active,
        pair_taken,
        "Loaded attendance references"
    );
    Ok(AttendanceReferences {
        user_exists,
        event_active,
        pair_taken,
    })
}

/// ## Summary
/// Records that a user plans to attend an event.
///
/// ## Errors
/// Returns `Validation` if a rule fails and `Persistence` if the store
/// rejects the write.
#[tracing::instrument(skip(conn))]
pub async fn create_attendance(
    conn: &mut AsyncPgConnection,
    draft: AttendanceDraft,
) -> ServiceResult<Attendance> {
    let attendance = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let references = load_references(tx, draft, None).await?;
                let new_attendance = validate_attendance(draft, references)
                    .inspect_err(|errors| tracing::warn!(%errors, "Rejected attendance"))?;

                Ok(query::create_attendance(tx, &new_attendance).await?)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(attendance_id = attendance.id, "Attendance recorded");
    Ok(attendance)
}

/// ## Summary
/// Revalidates and overwrites an attendance. The event must still be
/// active, so an attendance for a deactivated event can no longer change.
///
/// ## Errors
/// Returns `NotFound` if no attendance has `id`, `Validation` if a rule
/// fails, and `Persistence` if the store rejects the write.
#[tracing::instrument(skip(conn))]
pub async fn update_attendance(
    conn: &mut AsyncPgConnection,
    id: i32,
    draft: AttendanceDraft,
) -> ServiceResult<Attendance> {
    let attendance = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                if query::get_attendance(tx, id).await?.is_none() {
                    return Err(ServiceError::NotFound {
                        entity: "attendance",
                        id,
                    });
                }

                let references = load_references(tx, draft, Some(id)).await?;
                let changes = validate_attendance(draft, references)
                    .inspect_err(|errors| tracing::warn!(%errors, "Rejected attendance"))?;

                Ok(query::update_attendance(tx, id, &changes).await?)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(attendance_id = attendance.id, "Attendance updated");
    Ok(attendance)
}

/// ## Summary
/// Confirms or unconfirms an attendance through a full update.
///
/// ## Errors
/// Same as [`update_attendance`]; confirming after the event was
/// deactivated fails on `event`.
pub async fn set_confirmed(
    conn: &mut AsyncPgConnection,
    id: i32,
    confirmed: bool,
) -> ServiceResult<Attendance> {
    let current = get_attendance(conn, id).await?;
    let draft = AttendanceDraft {
        confirmed: Some(confirmed),
        ..AttendanceDraft::from(&current)
    };
    update_attendance(conn, id, draft).await
}

/// ## Summary
/// Fetches an attendance by ID.
///
/// ## Errors
/// Returns `NotFound` if no attendance has `id`.
#[tracing::instrument(skip(conn))]
pub async fn get_attendance(conn: &mut AsyncPgConnection, id: i32) -> ServiceResult<Attendance> {
    query::get_attendance(conn, id)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "attendance",
            id,
        })
}

/// ## Summary
/// Withdraws an attendance.
///
/// ## Errors
/// Returns `NotFound` if no attendance has `id`.
#[tracing::instrument(skip(conn))]
pub async fn delete_attendance(conn: &mut AsyncPgConnection, id: i32) -> ServiceResult<()> {
    match query::delete_attendance(conn, id).await? {
        0 => Err(ServiceError::NotFound {
            entity: "attendance",
            id,
        }),
        _ => {
            tracing::info!(attendance_id = id, "Attendance withdrawn");
            Ok(())
        }
    }
}

/// ## Errors
/// Returns `Persistence` if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn list_attendances(
    conn: &mut AsyncPgConnection,
    filter: AttendanceFilter,
) -> ServiceResult<Vec<Attendance>> {
    Ok(query::load_attendances(conn, filter).await?)
}
