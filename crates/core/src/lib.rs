//! Rocket Cart Core - Shared types library.
//!
//! This crate provides the types used across all Rocket Cart components:
//! - `rocket-cart` - Cart store, catalog client, storage and notifier adapters
//! - `rocket-cart-cli` - Command-line driver and dev catalog server
//!
//! # Architecture
//!
//! The core crate contains only types and pure cart arithmetic - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it to
//! be used anywhere, including from a UI layer that only renders the cart.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, catalog records and the [`Cart`] aggregate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
