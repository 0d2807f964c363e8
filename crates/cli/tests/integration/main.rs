//! CLI integration tests that run real shell scripts.

mod common;

mod apply_tests;
mod destroy_tests;
mod query_tests;
