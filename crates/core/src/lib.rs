//! StoreRate Core - Shared domain types.
//!
//! This crate provides the types shared by every StoreRate component:
//! - `api` - The REST service (auth, stores, ratings)
//! - `cli` - Command-line tools for migrations and account bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Database encode/decode support is behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, roles and rating values

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
