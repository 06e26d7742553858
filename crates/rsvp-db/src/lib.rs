//! Persistence for the RSVP data core: schema, migrations, row models and
//! the query builders behind every scope.

pub mod db;
pub mod error;
pub mod model;
