//! Shared building blocks for the RSVP workspace: settings, the injectable
//! clock, and field-scoped validation errors.

pub mod clock;
pub mod config;
pub mod error;
pub mod validation;
