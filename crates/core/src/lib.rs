//! Bookshelf Core - Shared types library.
//!
//! This crate provides the domain types used by the Bookshelf storefront:
//! - `storefront` - Cart store, persistence adapters and session state
//! - `integration-tests` - Cross-crate behaviour tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! storage access, no notifications. This keeps cart arithmetic testable
//! in isolation and usable from any view layer.
//!
//! # Modules
//!
//! - [`types`] - Book records, cart contents, prices, IDs and order summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
