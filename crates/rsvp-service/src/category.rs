use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use serde::Deserialize;

use rsvp_core::validation::ValidationErrors;
use rsvp_db::db::query::category::{self as query, CategoryFilter};
use rsvp_db::model::category::{Category, NewCategory};

use crate::error::{ServiceError, ServiceResult};

pub const NAME_TAKEN: &str = "has already been taken";

/// Unvalidated category input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl CategoryDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        Self {
            name: Some(name.into()),
            active: Some(active),
        }
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self::new(category.name.clone(), category.active)
    }
}

/// ## Summary
/// Applies the category rules. `name_taken` says whether another category
/// already uses the name, ignoring case.
///
/// ## Errors
/// Returns every failed field.
pub fn validate_category(
    draft: &CategoryDraft,
    name_taken: bool,
) -> Result<NewCategory<'_>, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = errors.require_text("name", draft.name.as_deref());
    if name.is_some() && name_taken {
        errors.add("name", NAME_TAKEN);
    }
    let active = errors.require_flag("active", draft.active);

    match (name, active) {
        (Some(name), Some(active)) => errors.into_result(NewCategory { name, active }),
        _ => Err(errors),
    }
}

async fn is_name_taken(
    conn: &mut AsyncPgConnection,
    draft: &CategoryDraft,
    except_id: Option<i32>,
) -> ServiceResult<bool> {
    match draft.name.as_deref() {
        Some(name) if !name.trim().is_empty() => {
            Ok(query::name_taken(conn, name, except_id).await?)
        }
        _ => Ok(false),
    }
}

/// ## Summary
/// Validates and inserts a category.
///
/// ## Errors
/// Returns `Validation` if a rule fails and `Persistence` if the store
/// rejects the write.
#[tracing::instrument(skip(conn))]
pub async fn create_category(
    conn: &mut AsyncPgConnection,
    draft: &CategoryDraft,
) -> ServiceResult<Category> {
    let category = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let taken = is_name_taken(tx, draft, None).await?;
                let new_category = validate_category(draft, taken)
                    .inspect_err(|errors| tracing::warn!(%errors, "Rejected category"))?;

                Ok(query::create_category(tx, &new_category).await?)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(category_id = category.id, "Category created");
    Ok(category)
}

/// ## Summary
/// Revalidates and overwrites a category.
///
/// ## Errors
/// Returns `NotFound` if no category has `id`, `Validation` if a rule
/// fails, and `Persistence` if the store rejects the write.
#[tracing::instrument(skip(conn))]
pub async fn update_category(
    conn: &mut AsyncPgConnection,
    id: i32,
    draft: &CategoryDraft,
) -> ServiceResult<Category> {
    let category = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                if query::get_category(tx, id).await?.is_none() {
                    return Err(ServiceError::NotFound {
                        entity: "category",
                        id,
                    });
                }

                let taken = is_name_taken(tx, draft, Some(id)).await?;
                let changes = validate_category(draft, taken)
                    .inspect_err(|errors| tracing::warn!(%errors, "Rejected category"))?;

                Ok(query::update_category(tx, id, &changes).await?)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(category_id = category.id, "Category updated");
    Ok(category)
}

/// ## Summary
/// Activates or deactivates a category. Existing events keep their
/// category; an inactive one only refuses new or revalidated events.
///
/// ## Errors
/// Same as [`update_category`].
pub async fn set_category_active(
    conn: &mut AsyncPgConnection,
    id: i32,
    active: bool,
) -> ServiceResult<Category> {
    let current = get_category(conn, id).await?;
    let draft = CategoryDraft {
        active: Some(active),
        ..CategoryDraft::from(&current)
    };
    update_category(conn, id, &draft).await
}

/// ## Summary
/// Fetches a category by ID.
///
/// ## Errors
/// Returns `NotFound` if no category has `id`.
#[tracing::instrument(skip(conn))]
pub async fn get_category(conn: &mut AsyncPgConnection, id: i32) -> ServiceResult<Category> {
    query::get_category(conn, id)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "category",
            id,
        })
}

/// ## Errors
/// Returns `Persistence` if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn list_categories(
    conn: &mut AsyncPgConnection,
    filter: CategoryFilter,
) -> ServiceResult<Vec<Category>> {
    Ok(query::load_categories(conn, filter).await?)
}
