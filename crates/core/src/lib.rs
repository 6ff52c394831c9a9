//! Sizeswap Core - Shared domain types and pure algorithms.
//!
//! This crate provides the pieces of sized-variant reconciliation that do not
//! talk to Shopify:
//! - `webhooks` - HTTP service that edits orders and updates donation totals
//! - `cli` - Operator tools for previewing and replaying webhook payloads
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything here can be exercised in plain unit tests.
//!
//! # Modules
//!
//! - [`types`] - Shopify global IDs and the inbound webhook payload
//! - [`sizing`] - Tag/size parsing and placeholder SKU resolution
//! - [`donation`] - Donation ledger arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod donation;
pub mod sizing;
pub mod types;

pub use sizing::{
    MarkerPattern, Placeholder, PlaceholderTag, ResolveError, ResolvedSku, SizeToken, TagSet,
};
pub use types::*;
