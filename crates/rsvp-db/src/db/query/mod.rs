//! Query builders and row operations, one module per table.
//!
//! Scopes are expressed as filter structs that build a boxed query, so they
//! compose freely: `EventFilter::new().active().current(now).by_start_time()`.

pub mod attendance;
pub mod category;
pub mod event;
pub mod user;
