//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, filesystem
//! access, registry and webhook HTTP, environment configuration and directory
//! discovery.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::cli` are forbidden.

pub mod command_runner;
pub mod config;
pub mod discovery;
pub mod fs;
pub mod notifier;
pub mod registry;
