//! Free-text product filter.

use crate::catalog::Product;

/// Products whose title or category contains `term`, compared case-insensitively.
///
/// Source order is kept and an empty term keeps everything. The term is not trimmed or
/// tokenized; it must appear as one substring.
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.to_lowercase();
    products
        .iter()
        .filter(|p| matches_term(p, &needle))
        .collect()
}

/// `needle` must already be lowercased.
fn matches_term(product: &Product, needle: &str) -> bool {
    needle.is_empty()
        || product.title.to_lowercase().contains(needle)
        || product.category.to_lowercase().contains(needle)
}
