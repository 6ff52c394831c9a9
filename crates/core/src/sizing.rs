//! Placeholder SKU resolution.
//!
//! Sized products are sold through a single placeholder variant. The product
//! carries a tag such as `PS310G-22-SIZE`; combined with the size the
//! customer picked it names the concrete catalog SKU (`PS310G-22-M`).
//!
//! ```
//! use sizeswap_core::{LineItemRequest, MarkerPattern, sizing};
//!
//! let item = LineItemRequest {
//!     id: "gid://shopify/LineItem/1".into(),
//!     sku: "PS310G-22-SIZE, other-tag".into(),
//!     size: Some("YM".into()),
//!     variant_title: None,
//!     quantity: Some(2),
//! };
//!
//! let placeholder = sizing::resolve(&item, MarkerPattern::Substring)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(placeholder.sku.as_str(), "PS310G-22-M");
//! ```

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::LineItemRequest;

/// Literal marker carried by placeholder tags.
pub const SIZE_MARKER: &str = "SIZE";

/// Youth size codes. The catalog encodes youth sizes without the `Y`.
const YOUTH_SIZES: &[&str] = &["YXS", "YS", "YM", "YL", "YXL"];

/// How placeholder tags are recognized and rewritten.
///
/// Exactly one rule is active per deployment; both are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPattern {
    /// Any tag containing `SIZE`; every occurrence is replaced.
    #[default]
    Substring,
    /// Only tags ending in `-SIZE`; the suffix is replaced.
    Suffix,
}

impl MarkerPattern {
    /// Check whether `tag` is a placeholder under this rule.
    #[must_use]
    pub fn matches(self, tag: &str) -> bool {
        match self {
            Self::Substring => tag.contains(SIZE_MARKER),
            Self::Suffix => tag.ends_with("-SIZE"),
        }
    }

    /// Rewrite a placeholder tag with the given size.
    #[must_use]
    pub fn substitute(self, tag: &str, size: &SizeToken) -> String {
        match self {
            Self::Substring => tag.replace(SIZE_MARKER, size.as_str()),
            Self::Suffix => {
                let stem = tag.strip_suffix(SIZE_MARKER).unwrap_or(tag);
                format!("{stem}{size}")
            }
        }
    }
}

impl fmt::Display for MarkerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring => write!(f, "substring"),
            Self::Suffix => write!(f, "suffix"),
        }
    }
}

impl FromStr for MarkerPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "suffix" => Ok(Self::Suffix),
            other => Err(format!(
                "unknown marker pattern '{other}' (expected 'substring' or 'suffix')"
            )),
        }
    }
}

/// Ordered, trimmed tags parsed from a comma-joined string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Split `raw` on commas, trimming and dropping empty entries.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// First tag matching the marker pattern.
    #[must_use]
    pub fn placeholder(&self, pattern: MarkerPattern) -> Option<&str> {
        self.0
            .iter()
            .map(String::as_str)
            .find(|t| pattern.matches(t))
    }

    /// Iterate over the tags in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no tags were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalized size taken from a variant title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SizeToken(String);

impl SizeToken {
    /// Extract the size from a variant title.
    ///
    /// `"Black / Large"` yields `Large`; youth codes lose their leading `Y`
    /// (`YXL` becomes `XL`). Returns `None` when nothing is left.
    #[must_use]
    pub fn parse(title: &str) -> Option<Self> {
        let token = title.rsplit('/').next().unwrap_or(title).trim();
        if token.is_empty() {
            return None;
        }

        let upper = token.to_ascii_uppercase();
        let token = if YOUTH_SIZES.contains(&upper.as_str()) {
            token.get(1..).unwrap_or(token)
        } else {
            token
        };

        Some(Self(token.to_owned()))
    }

    /// Get the size as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a catalog variant title.
    ///
    /// Titles of multi-option variants are compared on their last segment.
    #[must_use]
    pub fn matches_title(&self, title: &str) -> bool {
        let last = title.rsplit('/').next().unwrap_or(title).trim();
        last.eq_ignore_ascii_case(&self.0) || title.trim().eq_ignore_ascii_case(&self.0)
    }
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The tag that carries the size marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlaceholderTag(String);

impl PlaceholderTag {
    /// Get the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceholderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Concrete catalog SKU produced from a placeholder tag and a size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResolvedSku(String);

impl ResolvedSku {
    /// Get the SKU as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A line item that must be swapped for a concrete variant.
///
/// Keeps the placeholder tag and its resolved SKU together so that matching
/// by tag never depends on the position of the item in the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    /// Order line item ID from the webhook.
    pub line_item_id: String,
    /// Tag carrying the size marker.
    pub tag: PlaceholderTag,
    /// Concrete SKU to look up.
    pub sku: ResolvedSku,
    /// Size substituted into the tag.
    pub size: SizeToken,
    /// Quantity to fall back to when the order line is not found.
    pub requested_quantity: i64,
}

/// Errors that prevent a placeholder from being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The line has a placeholder tag but no usable size.
    #[error("line item {line_item_id} has placeholder tag {tag} but no size")]
    MissingSize {
        /// Order line item ID.
        line_item_id: String,
        /// The placeholder tag found.
        tag: String,
    },
}

/// Resolve the placeholder carried by a webhook line item.
///
/// Returns `Ok(None)` when no tag carries the size marker; such lines are
/// not part of the reconciliation.
///
/// # Errors
///
/// Returns [`ResolveError::MissingSize`] when a placeholder tag exists but
/// the size is absent or blank. The line must then be skipped rather than
/// looked up with a half-substituted SKU.
pub fn resolve(
    item: &LineItemRequest,
    pattern: MarkerPattern,
) -> Result<Option<Placeholder>, ResolveError> {
    let tags = TagSet::parse(&item.sku);
    let Some(tag) = tags.placeholder(pattern) else {
        return Ok(None);
    };

    let size = item
        .size_title()
        .and_then(SizeToken::parse)
        .ok_or_else(|| ResolveError::MissingSize {
            line_item_id: item.id.clone(),
            tag: tag.to_owned(),
        })?;

    Ok(Some(Placeholder {
        line_item_id: item.id.clone(),
        tag: PlaceholderTag(tag.to_owned()),
        sku: ResolvedSku(pattern.substitute(tag, &size)),
        size,
        requested_quantity: item.requested_quantity(),
    }))
}

/// Outcome of resolving one line item, for dry-run reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPreview {
    /// Order line item ID.
    pub line_item_id: String,
    /// Tags parsed from the raw `sku` field.
    pub tags: TagSet,
    /// Normalized size, if any.
    pub size: Option<SizeToken>,
    /// Placeholder tag, if any.
    pub placeholder_tag: Option<PlaceholderTag>,
    /// Resolved SKU, if resolution succeeded.
    pub resolved_sku: Option<ResolvedSku>,
    /// Why the line would be skipped, if it would.
    pub skip_reason: Option<String>,
}

/// Resolve a line item and describe every intermediate value.
#[must_use]
pub fn preview(item: &LineItemRequest, pattern: MarkerPattern) -> ResolutionPreview {
    let tags = TagSet::parse(&item.sku);
    let size = item.size_title().and_then(SizeToken::parse);

    let (placeholder_tag, resolved_sku, skip_reason) = match resolve(item, pattern) {
        Ok(Some(p)) => (Some(p.tag), Some(p.sku), None),
        Ok(None) => (
            None,
            None,
            Some(format!("no tag matches the {pattern} marker pattern")),
        ),
        Err(e) => (
            tags.placeholder(pattern)
                .map(|t| PlaceholderTag(t.to_owned())),
            None,
            Some(e.to_string()),
        ),
    };

    ResolutionPreview {
        line_item_id: item.id.clone(),
        tags,
        size,
        placeholder_tag,
        resolved_sku,
        skip_reason,
    }
}
