//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `std::fs`, `std::process`, or `std::net`. All functions are synchronous
//! and take data in, returning data out.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod image;
pub mod notice;
pub mod patch;
pub mod registry;
pub mod service;
pub mod version;

pub use config::UpdaterConfig;
pub use error::{ConfigError, DescriptorError, SkipReason};
pub use notice::Notice;
pub use registry::{Platform, RegistryTag, TagListing, TagPage};
pub use service::{PolicyGroup, Service, UpdateCycle};
