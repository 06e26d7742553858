//! Entity operations: every save validates, then writes inside one
//! transaction. Lookups that signal absence return `ServiceError::NotFound`.

pub mod attendance;
pub mod category;
pub mod context;
pub mod error;
pub mod event;
pub mod user;
