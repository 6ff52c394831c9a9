//! Offline placeholder resolution.
//!
//! # Usage
//!
//! ```bash
//! sizeswap resolve payload.json
//! sizeswap resolve payload.json --pattern suffix
//! ```
//!
//! Prints what `/api/replace-dummy` would do with each line item without
//! contacting Shopify.

use std::fmt::Write as _;
use std::path::Path;

use sizeswap_core::{
    MarkerPattern, ReplacementRequest,
    sizing::{self, ResolutionPreview},
};

use super::{CommandError, load_payload};

/// Resolve every line item of a payload file and print the table.
///
/// # Errors
///
/// Returns an error if the payload cannot be loaded.
#[allow(clippy::print_stdout)]
pub fn run(path: &Path, pattern: MarkerPattern) -> Result<(), CommandError> {
    let request = load_payload(path)?;
    print!("{}", render(&request, pattern));
    Ok(())
}

/// Build the resolution table for a request.
#[must_use]
pub fn render(request: &ReplacementRequest, pattern: MarkerPattern) -> String {
    let previews: Vec<ResolutionPreview> = request
        .line_items
        .iter()
        .map(|item| sizing::preview(item, pattern))
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "Order {} ({pattern} pattern)", request.order_id);
    for p in &previews {
        let tags = p.tags.iter().collect::<Vec<_>>().join(",");
        let size = p.size.as_ref().map_or("-", |s| s.as_str());
        let _ = write!(out, "  {} tags=[{tags}] size={size}", p.line_item_id);
        match (&p.placeholder_tag, &p.resolved_sku, &p.skip_reason) {
            (Some(tag), Some(sku), _) => {
                let _ = writeln!(out, " {} -> {}", tag.as_str(), sku.as_str());
            }
            (_, _, Some(reason)) => {
                let _ = writeln!(out, " skipped: {reason}");
            }
            _ => {
                let _ = writeln!(out);
            }
        }
    }

    let resolved = previews.iter().filter(|p| p.resolved_sku.is_some()).count();
    let _ = writeln!(out, "{resolved} of {} line items resolved", previews.len());
    out
}
