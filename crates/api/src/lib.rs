//! StoreRate API library.
//!
//! This crate provides the HTTP API as a library, allowing it to be tested
//! and reused by the CLI. The `storerate-api` binary wires it to a listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
