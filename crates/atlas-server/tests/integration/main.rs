//! Router tests over the in-memory store, driven with `tower::ServiceExt::oneshot`.

mod common;
mod remote_lookup_tests;
