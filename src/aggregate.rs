//! Category counts for the chart.

use indexmap::IndexMap;

use crate::catalog::Product;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

impl CategoryCount {
    pub fn new(category: impl Into<String>, count: usize) -> Self {
        Self {
            category: category.into(),
            count,
        }
    }

    /// Sum of all counts; equals the number of products that were aggregated.
    pub fn total(counts: &[CategoryCount]) -> usize {
        counts.iter().map(|c| c.count).sum()
    }

    pub fn max(counts: &[CategoryCount]) -> usize {
        counts.iter().map(|c| c.count).max().unwrap_or(0)
    }
}

/// Count products per exact (case-sensitive) category, in order of first appearance.
pub fn count_by_category(products: &[&Product]) -> Vec<CategoryCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for product in products {
        *counts.entry(product.category.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| CategoryCount::new(category, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let products = vec![
            Product::new(1, "a", 1, "b-cat"),
            Product::new(2, "b", 1, "a-cat"),
            Product::new(3, "c", 1, "b-cat"),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        assert_eq!(
            count_by_category(&refs),
            vec![CategoryCount::new("b-cat", 2), CategoryCount::new("a-cat", 1)]
        );
    }

    #[test]
    fn test_case_sensitive_groups() {
        let products = vec![
            Product::new(1, "a", 1, "Clothing"),
            Product::new(2, "b", 1, "clothing"),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        let counts = count_by_category(&refs);
        assert_eq!(counts.len(), 2);
        assert_eq!(CategoryCount::total(&counts), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(count_by_category(&[]).is_empty());
        assert_eq!(CategoryCount::max(&[]), 0);
    }
}
