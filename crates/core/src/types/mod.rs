//! Core types for sizeswap.
//!
//! This module provides type-safe wrappers for Shopify IDs and the inbound
//! replacement payload.

pub mod id;
pub mod line_item;

pub use id::*;
pub use line_item::{LineItemRequest, PayloadError, ReplacementPayload, ReplacementRequest};
