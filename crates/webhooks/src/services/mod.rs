//! Business logic services for the webhook endpoints.
//!
//! # Services
//!
//! - `donation` - Donation ledger stored in a page metafield

pub mod donation;

pub use donation::{Adjustment, DonationError, DonationLedger, DonationUpdate};
