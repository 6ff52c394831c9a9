//! Placeholder replacement on live orders.
//!
//! The pieces, leaves first:
//! - [`gateway`] - the Shopify operations the engine needs, as a trait
//! - [`locator`] - resolved SKU to concrete variant, with a tag fallback
//! - [`matcher`] - which calculated line items belong to which placeholder
//! - [`orchestrator`] - the begin/remove/add/commit edit session

pub mod gateway;
pub mod locator;
pub mod matcher;
pub mod orchestrator;

pub use gateway::CommerceGateway;
pub use locator::LocateError;
pub use matcher::{MatchPlan, MatchRecord};
pub use orchestrator::{EditState, ReconcileError, ReconcileReport, Reconciler};

#[cfg(test)]
pub(crate) mod testing;
