#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Database integration tests.
//!
//! Each test runs inside a transaction that is never committed. A missing or
//! unreachable database fails the test instead of skipping it.

mod attendance;
mod category;
mod helpers;
mod seeder;
mod user;
