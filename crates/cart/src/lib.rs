//! Rocket Cart library.
//!
//! A shopping-cart state container that keeps an in-memory cart in step with
//! persisted storage and a remote product catalog.
//!
//! # Architecture
//!
//! [`CartStore`] depends on three seams, each a trait with shipped adapters:
//!
//! - [`RemoteCatalog`] - products and stock ([`HttpCatalog`])
//! - [`PersistedStore`] - durable key/value storage ([`MemoryStore`], [`FileStore`])
//! - [`Notifier`] - user-facing failure notices ([`TracingNotifier`], [`ToastQueue`])
//!
//! The [`server`] module provides a development catalog backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod server;
pub mod storage;
pub mod store;

pub use catalog::{CatalogError, HttpCatalog, RemoteCatalog, StockUpdate};
pub use config::{CartConfig, ConfigError};
pub use error::{CartError, Operation};
pub use notify::{Notice, Notifier, ToastQueue, TracingNotifier};
pub use storage::{FileStore, MemoryStore, PersistedStore, StorageError};
pub use store::{CartStore, UpdateProductAmount};
