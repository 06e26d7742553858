use std::collections::HashSet;

use diesel_async::AsyncPgConnection;
use rsvp_service::error::ServiceError;

pub use rsvp_test::*;

/// Opens a test connection, failing the test when no database is reachable.
pub async fn connect() -> AsyncPgConnection {
    test_connection()
        .await
        .expect("Failed to open test connection; set TEST_DATABASE_URL or DATABASE_URL")
}

/// Keeps only rows whose ID is in `ids`, preserving order.
pub fn only<T>(rows: Vec<T>, ids: &[i32], id: impl Fn(&T) -> i32) -> Vec<T> {
    let wanted: HashSet<i32> = ids.iter().copied().collect();
    rows.into_iter().filter(|row| wanted.contains(&id(row))).collect()
}

/// Unwraps a validation failure, panicking on any other outcome.
pub fn validation_error<T: std::fmt::Debug>(
    result: Result<T, ServiceError>,
) -> rsvp_core::validation::ValidationErrors {
    match result {
        Err(ServiceError::Validation(errors)) => errors,
        other => panic!("expected a validation failure, got {other:?}"),
    }
}
