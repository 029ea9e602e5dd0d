//! PostgreSQL repository tests. They start a container through
//! testcontainers, so they are ignored by default:
//! `cargo test -p atlas-db -- --ignored`.

mod common;
mod repository_tests;
