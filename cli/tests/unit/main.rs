//! Unit tests for compose-update
//!
//! These tests use in-memory ports and run fast without network or Docker.

mod architecture;
mod helpers;
mod mocks;
mod property_tests;
