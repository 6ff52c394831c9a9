//! Shopify global IDs for type-safe entity references.
//!
//! Use the `define_gid!` macro to create type-safe wrappers that prevent
//! accidentally passing a calculated line item ID where a variant ID is
//! expected.

use thiserror::Error;

/// Prefix shared by every Shopify Admin API global ID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors that can occur when parsing a Shopify global ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GidError {
    /// The input string is empty.
    #[error("id cannot be empty")]
    Empty,
    /// The input is a GID for a different resource type.
    #[error("expected a {expected} id, got {found}")]
    WrongResource {
        /// Resource the caller asked for.
        expected: &'static str,
        /// Resource found in the input.
        found: String,
    },
    /// The input is neither a numeric id nor a Shopify GID.
    #[error("invalid {resource} id: {input}")]
    Invalid {
        /// Resource the caller asked for.
        resource: &'static str,
        /// The rejected input.
        input: String,
    },
}

/// Normalize `input` into a `gid://shopify/<resource>/<id>` string.
///
/// Accepts either the full GID or the bare numeric id Shopify shows in the
/// admin UI and legacy REST payloads.
///
/// # Errors
///
/// Returns [`GidError`] if the input is empty, names another resource, or is
/// not a recognizable id.
pub fn normalize_gid(input: &str, resource: &'static str) -> Result<String, GidError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(GidError::Empty);
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(format!("{GID_PREFIX}{resource}/{input}"));
    }

    let Some(rest) = input.strip_prefix(GID_PREFIX) else {
        return Err(GidError::Invalid {
            resource,
            input: input.to_owned(),
        });
    };

    match rest.split_once('/') {
        Some((found, id)) if found == resource && !id.is_empty() => Ok(input.to_owned()),
        Some((found, _)) if found != resource => Err(GidError::WrongResource {
            expected: resource,
            found: found.to_owned(),
        }),
        _ => Err(GidError::Invalid {
            resource,
            input: input.to_owned(),
        }),
    }
}

/// Macro to define a type-safe Shopify GID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()` (trusted, from API responses) and `parse()` (validated, from user input)
/// - `Display`, `AsRef<str>` and `From<$name> for String`
///
/// # Example
///
/// ```rust
/// # use sizeswap_core::define_gid;
/// define_gid!(OrderGid, "Order");
///
/// let id = OrderGid::parse("1001").unwrap();
/// assert_eq!(id.as_str(), "gid://shopify/Order/1001");
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Shopify resource name used in the GID path.
            pub const RESOURCE: &'static str = $resource;

            /// Wrap an ID returned by the Shopify API without validation.
            #[must_use]
            pub fn new(gid: impl Into<String>) -> Self {
                Self(gid.into())
            }

            /// Parse a user-supplied ID, accepting a GID or a bare number.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is not a valid ID for this resource.
            pub fn parse(input: &str) -> Result<Self, $crate::types::GidError> {
                $crate::types::id::normalize_gid(input, $resource).map(Self)
            }

            /// Get the GID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the trailing numeric part of the GID.
            #[must_use]
            pub fn numeric_id(&self) -> &str {
                self.0.rsplit('/').next().unwrap_or(&self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Shopify resources touched by order reconciliation and the donation ledger
define_gid!(OrderGid, "Order");
define_gid!(LineItemGid, "LineItem");
define_gid!(CalculatedOrderGid, "CalculatedOrder");
define_gid!(CalculatedLineItemGid, "CalculatedLineItem");
define_gid!(VariantGid, "ProductVariant");
define_gid!(ProductGid, "Product");
define_gid!(PageGid, "Page");
define_gid!(MetafieldGid, "Metafield");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_order_id() {
        let id = OrderGid::parse("5512345678").unwrap();
        assert_eq!(id.as_str(), "gid://shopify/Order/5512345678");
        assert_eq!(id.numeric_id(), "5512345678");
    }

    #[test]
    fn test_parse_full_gid_is_kept() {
        let id = OrderGid::parse(" gid://shopify/Order/42 ").unwrap();
        assert_eq!(id.as_str(), "gid://shopify/Order/42");
    }

    #[test]
    fn test_parse_wrong_resource() {
        let err = OrderGid::parse("gid://shopify/Product/42").unwrap_err();
        assert_eq!(
            err,
            GidError::WrongResource {
                expected: "Order",
                found: "Product".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(OrderGid::parse("   ").unwrap_err(), GidError::Empty);
        assert!(matches!(
            OrderGid::parse("order-42").unwrap_err(),
            GidError::Invalid { .. }
        ));
        assert!(matches!(
            OrderGid::parse("gid://shopify/Order/").unwrap_err(),
            GidError::Invalid { .. }
        ));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = VariantGid::new("gid://shopify/ProductVariant/7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gid://shopify/ProductVariant/7\"");
        let back: VariantGid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
