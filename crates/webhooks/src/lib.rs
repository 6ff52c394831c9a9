//! Sizeswap webhook service library.
//!
//! Receives Shopify Flow webhooks, swaps placeholder "size" line items for the
//! concrete sized variant through an order edit, and keeps the donation total
//! metafield in step with paid and cancelled orders.
//!
//! The binary in `main.rs` only wires configuration, telemetry and the
//! listener; everything else lives here so it can be tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod reconcile;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
