//! Shopfront Core - Shared types library.
//!
//! This crate provides the types that flow between Shopfront components:
//! - `cart` - Client-side cart store, persistence and checkout
//! - `cli` - Command-line driver over a local catalog
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no platform clients. Product records arrive from the hosted catalog and
//! pass through these types unchanged.
//!
//! # Modules
//!
//! - [`types`] - Product records, type-safe IDs, prices and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
