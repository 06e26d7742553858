//! Event operations.
//!
//! Validation is split in two: the pure [`validate_event`] applies every rule
//! to a draft plus the facts looked up from the store ([`EventReferences`]),
//! and the async operations gather those facts and write inside one
//! transaction.

use chrono::{DateTime, TimeDelta, Utc};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use serde::Deserialize;

use rsvp_core::validation::{BLANK, ValidationErrors};
use rsvp_db::db::query::category as category_query;
use rsvp_db::db::query::event::{self as query, EventFilter};
use rsvp_db::db::query::user::{self as user_query, UserFilter};
use rsvp_db::model::event::{Event, NewEvent};
use rsvp_db::model::user::User;

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};

pub const CREATOR_UNKNOWN: &str = "is not recognized by the system";
pub const CATEGORY_INACTIVE: &str = "is not active in the system";

/// Unvalidated event input. Every field may be missing; validation reports
/// each one that is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    /// Creator.
    pub user_id: Option<i32>,
    pub category_id: Option<i32>,
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            name: Some(event.name.clone()),
            description: Some(event.description.clone()),
            latitude: event.latitude,
            longitude: event.longitude,
            start_time: Some(event.start_time),
            end_time: event.end_time,
            active: Some(event.active),
            user_id: Some(event.user_id),
            category_id: Some(event.category_id),
        }
    }
}

/// Facts about referenced rows, read at validation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventReferences {
    pub creator_exists: bool,
    /// `None` when the category does not exist.
    pub category_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// The start time may not lie further than `tolerance` before `now`.
    Create {
        now: DateTime<Utc>,
        tolerance: TimeDelta,
    },
    Update,
}

impl ValidationMode {
    /// Creation rules at the context's current instant and tolerance.
    #[must_use]
    pub fn create(ctx: &ServiceContext) -> Self {
        Self::Create {
            now: ctx.now(),
            tolerance: ctx.start_time_tolerance(),
        }
    }
}

/// ## Summary
/// Applies every event rule and maps the draft onto a writable row.
///
/// ## Errors
/// Returns every failed field, in rule order: creator, category, name,
/// description, active, coordinates, start time, end time.
pub fn validate_event(
    draft: &EventDraft,
    references: EventReferences,
    mode: ValidationMode,
) -> Result<NewEvent<'_>, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let user_id = errors.require_id("user_id", draft.user_id);
    if !references.creator_exists {
        errors.add("creator", CREATOR_UNKNOWN);
    }

    let category_id = errors.require_id("category_id", draft.category_id);
    if category_id.is_some() && references.category_active != Some(true) {
        errors.add("category", CATEGORY_INACTIVE);
    }

    let name = errors.require_text("name", draft.name.as_deref());
    let description = errors.require_text("description", draft.description.as_deref());
    let active = errors.require_flag("active", draft.active);
    errors.optional_number("latitude", draft.latitude);
    errors.optional_number("longitude", draft.longitude);

    let start_time = draft.start_time;
    match (start_time, mode) {
        (None, _) => errors.add("start_time", BLANK),
        (Some(start), ValidationMode::Create { now, tolerance }) => {
            let earliest = now - tolerance;
            if start < earliest {
                errors.add(
                    "start_time",
                    format!("must be on or after {}", earliest.to_rfc3339()),
                );
            }
        }
        (Some(_), ValidationMode::Update) => {}
    }

    if let Some((start, _)) = start_time
        .zip(draft.end_time)
        .filter(|(start, end)| end < start)
    {
        errors.add(
            "end_time",
            format!("must be on or after {}", start.to_rfc3339()),
        );
    }

    match (user_id, category_id, name, description, active, start_time) {
        (
            Some(user_id),
            Some(category_id),
            Some(name),
            Some(description),
            Some(active),
            Some(start_time),
        ) => errors.into_result(NewEvent {
            name,
            description,
            latitude: draft.latitude,
            longitude: draft.longitude,
            start_time,
            end_time: draft.end_time,
            active,
            user_id,
            category_id,
        }),
        _ => Err(errors),
    }
}

/// Looks up the creator and category with one indexed query each.
async fn load_references(
    conn: &mut AsyncPgConnection,
    draft: &EventDraft,
) -> ServiceResult<EventReferences> {
    let creator_exists = match draft.user_id {
        Some(id) if id > 0 => user_query::user_exists(conn, id).await?,
        _ => false,
    };
    let category_active = match draft.category_id {
        Some(id) if id > 0 => category_query::category_active(conn, id).await?,
        _ => None,
    };

    tracing::debug!(creator_exists, ?category_active, "Loaded event references");
    Ok(EventReferences {
        creator_exists,
        category_active,
    })
}

/// ## Summary
/// Validates and inserts an event, checking the start time against the
/// context clock.
///
/// ## Errors
/// Returns `Validation` if a rule fails and `Persistence` if the store
/// rejects the write.
#[tracing::instrument(skip(conn, ctx))]
pub async fn create_event(
    conn: &mut AsyncPgConnection,
    ctx: &ServiceContext,
    draft: &EventDraft,
) -> ServiceResult<Event> {
    let mode = ValidationMode::create(ctx);

    let event = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let references = load_references(tx, draft).await?;
                let new_event = validate_event(draft, references, mode)
                    .inspect_err(|errors| tracing::warn!(%errors, "Rejected event"))?;

                Ok(query::create_event(tx, &new_event).await?)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(event_id = event.id, "Event created");
    Ok(event)
}

/// ## Summary
/// Revalidates and overwrites an event. The start time is not compared with
/// the clock, but the creator and category checks run again.
///
/// ## Errors
/// Returns `NotFound` if no event has `id`, `Validation` if a rule fails,
/// and `Persistence` if the store rejects the write.
#[tracing::instrument(skip(conn))]
pub async fn update_event(
    conn: &mut AsyncPgConnection,
    id: i32,
    draft: &EventDraft,
) -> ServiceResult<Event> {
    let event = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                if query::event_active(tx, id).await?.is_none() {
                    return Err(ServiceError::NotFound { entity: "event", id });
                }

                let references = load_references(tx, draft).await?;
                let changes = validate_event(draft, references, ValidationMode::Update)
                    .inspect_err(|errors| tracing::warn!(%errors, "Rejected event"))?;

                Ok(query::update_event(tx, id, &changes).await?)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(event_id = event.id, "Event updated");
    Ok(event)
}

/// ## Summary
/// Activates or deactivates an event through a full update.
///
/// ## Errors
/// Same as [`update_event`].
pub async fn set_event_active(
    conn: &mut AsyncPgConnection,
    id: i32,
    active: bool,
) -> ServiceResult<Event> {
    let current = get_event(conn, id).await?;
    let draft = EventDraft {
        active: Some(active),
        ..EventDraft::from(&current)
    };
    update_event(conn, id, &draft).await
}

/// ## Summary
/// Fetches an event by ID.
///
/// ## Errors
/// Returns `NotFound` if no event has `id`.
#[tracing::instrument(skip(conn))]
pub async fn get_event(conn: &mut AsyncPgConnection, id: i32) -> ServiceResult<Event> {
    query::get_event(conn, id)
        .await?
        .ok_or(ServiceError::NotFound { entity: "event", id })
}

/// ## Summary
/// Deletes an event. Nothing cascades: an event with attendances is refused
/// by the store.
///
/// ## Errors
/// Returns `NotFound` if no event has `id` and `Persistence` if the store
/// refuses the delete.
#[tracing::instrument(skip(conn))]
pub async fn delete_event(conn: &mut AsyncPgConnection, id: i32) -> ServiceResult<()> {
    match query::delete_event(conn, id).await? {
        0 => Err(ServiceError::NotFound { entity: "event", id }),
        _ => {
            tracing::info!(event_id = id, "Event deleted");
            Ok(())
        }
    }
}

/// ## Errors
/// Returns `Persistence` if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn list_events(
    conn: &mut AsyncPgConnection,
    filter: EventFilter,
) -> ServiceResult<Vec<Event>> {
    Ok(query::load_events(conn, filter).await?)
}

/// ## Summary
/// Users holding an attendance for the event, by surname.
///
/// ## Errors
/// Returns `NotFound` if no event has `id`.
#[tracing::instrument(skip(conn))]
pub async fn attendees(conn: &mut AsyncPgConnection, event_id: i32) -> ServiceResult<Vec<User>> {
    if query::event_active(conn, event_id).await?.is_none() {
        return Err(ServiceError::NotFound {
            entity: "event",
            id: event_id,
        });
    }

    let filter = UserFilter::new().attending(event_id).alphabetical();
    Ok(user_query::load_users(conn, filter).await?)
}
