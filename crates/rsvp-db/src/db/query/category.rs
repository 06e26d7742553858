//! Query functions for categories.

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::db::schema::categories;
use crate::model::category::{Category, NewCategory};

pub type BoxedQuery<'a> = categories::BoxedQuery<'a, Pg>;

/// ## Summary
/// Returns a query to select all categories.
#[must_use]
pub fn all() -> BoxedQuery<'static> {
    categories::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a category by ID.
#[must_use]
pub fn by_id(id: i32) -> BoxedQuery<'static> {
    all().filter(categories::id.eq(id))
}

define_sql_function! {
    /// Text `lower()`, the same folding the unique name index uses.
    fn lower(x: Text) -> Text;
}

/// ## Summary
/// Returns a query matching `name` exactly, ignoring case.
#[must_use]
pub fn by_name_ignoring_case(name: &str) -> BoxedQuery<'static> {
    all().filter(lower(categories::name).eq(lower(name.to_string())))
}

/// Composable category scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub active: Option<bool>,
    pub alphabetical: bool,
}

impl CategoryFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn alphabetical(mut self) -> Self {
        self.alphabetical = true;
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

    #[must_use]
    pub fn into_query(self) -> BoxedQuery<'static> {
        let mut query = all();

        if let Some(active) = self.active {
            query = query.filter(categories::active.eq(active));
        }

        if self.alphabetical {
            query = query.order((categories::name.asc(), categories::id.asc()));
        } else {
            query = query.order(categories::id.asc());
        }

        query
    }
}

/// ## Summary
/// Inserts a new category and returns the inserted record.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_category(
    conn: &mut AsyncPgConnection,
    new_category: &NewCategory<'_>,
) -> QueryResult<Category> {
    diesel::insert_into(categories::table)
        .values(new_category)
        .returning(Category::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Overwrites a category and returns the updated record.
///
/// ## Errors
/// Returns a database error if the update fails, `NotFound` if no row has `id`.
pub async fn update_category(
    conn: &mut AsyncPgConnection,
    id: i32,
    changes: &NewCategory<'_>,
) -> QueryResult<Category> {
    diesel::update(categories::table.find(id))
        .set(changes)
        .returning(Category::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Retrieves a category by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_category(
    conn: &mut AsyncPgConnection,
    id: i32,
) -> QueryResult<Option<Category>> {
    by_id(id).first::<Category>(conn).await.optional()
}

/// ## Summary
/// Retrieves the category named `name`, ignoring case.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_name(
    conn: &mut AsyncPgConnection,
    name: &str,
) -> QueryResult<Option<Category>> {
    by_name_ignoring_case(name)
        .first::<Category>(conn)
        .await
        .optional()
}

/// ## Summary
/// Reads only the `active` flag of a category; `None` when it does not exist.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn category_active(
    conn: &mut AsyncPgConnection,
    id: i32,
) -> QueryResult<Option<bool>> {
    categories::table
        .find(id)
        .select(categories::active)
        .first::<bool>(conn)
        .await
        .optional()
}

/// ## Summary
/// Checks whether another category already uses `name`, ignoring case.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn name_taken(
    conn: &mut AsyncPgConnection,
    name: &str,
    except_id: Option<i32>,
) -> QueryResult<bool> {
    let mut query = by_name_ignoring_case(name);
    if let Some(id) = except_id {
        query = query.filter(categories::id.ne(id));
    }

    query
        .select(categories::id)
        .first::<i32>(conn)
        .await
        .optional()
        .map(|found| found.is_some())
}

/// ## Summary
/// Loads every category matching the filter.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn load_categories(
    conn: &mut AsyncPgConnection,
    filter: CategoryFilter,
) -> QueryResult<Vec<Category>> {
    filter.into_query().load::<Category>(conn).await
}
