//! Client tests against a local axum upstream bound to an ephemeral port.

mod common;
mod directory_tests;
mod remote_client_tests;
