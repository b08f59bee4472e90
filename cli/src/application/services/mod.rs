//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra` or `crate::cli`.

pub mod config_reader;
pub mod patcher;
pub mod tag_resolver;
pub mod update_cycle;
