//! Startup pieces of the `rsvp` binary that are worth testing on their own.

pub mod seeder;
