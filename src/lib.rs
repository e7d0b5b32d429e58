//! # healthhub
//!
//! Layout and backup engine for a personal health dashboard.
//!
//! The crate owns three things:
//!
//! - the **layout engine** ([`layout`]): the ordered, sized card arrangement
//!   for each user, with transactional edit sessions, named presets, and an
//!   admin-published default for new users
//! - the **text card store** ([`textcards`]): free-form rich-text cards that
//!   can be placed alongside the built-in panels on any page
//! - the **backup pipeline** ([`backup`]): full-snapshot export, structural
//!   validation, selective restore, and a scheduled upload job with a
//!   retention sweep
//!
//! Everything persists through the [`gateway`] traits, so the same code runs
//! against the in-memory store in tests and the filesystem store in
//! production. [`api::HubSession`] ties the pieces together per signed-in
//! user.

pub mod api;
pub mod backup;
pub mod config;
pub mod error;
pub mod gateway;
pub mod layout;
pub mod model;
pub mod paths;
pub mod registry;
pub mod reorder;
pub mod settings;
pub mod textcards;

pub use api::HubSession;
pub use config::HubConfig;
pub use error::{HubError, Result};
