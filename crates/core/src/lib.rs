//! Inkpost Core - Shared types library.
//!
//! This crate provides the domain types used across the Inkpost components:
//! - `server` - The blog web application
//! - `cli` - Command-line tools for migrations and user seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
