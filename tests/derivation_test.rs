use std::collections::HashSet;
use storeview::catalog::decode_products;
use storeview::{count_by_category, filter_products, CategoryCount, Product, ProductId};

fn scenario_products() -> Vec<Product> {
    vec![
        Product::new(1, "Red Shirt", 20, "clothing"),
        Product::new(2, "Blue Hat", 10, "accessories"),
        Product::new(3, "Green Shirt", 25, "clothing"),
    ]
}

/// A catalog shaped like the public demo endpoint
fn store_products() -> Vec<Product> {
    decode_products(
        r#"[
        {"id":1,"title":"Fjallraven Backpack","price":109.95,"category":"men's clothing"},
        {"id":2,"title":"Mens Casual Premium Slim Fit T-Shirts","price":22.3,"category":"men's clothing"},
        {"id":5,"title":"Legends Naga Gold & Silver Dragon Station Chain Bracelet","price":695,"category":"jewelery"},
        {"id":9,"title":"WD 2TB Elements Portable External Hard Drive","price":64,"category":"electronics"},
        {"id":10,"title":"SanDisk SSD PLUS 1TB Internal SSD","price":109,"category":"electronics"},
        {"id":15,"title":"BIYLACLESEN Women's 3-in-1 Snowboard Jacket","price":56.99,"category":"women's clothing"},
        {"id":18,"title":"MBJ Women's Solid Short Sleeve Boat Neck V","price":9.85,"category":"women's clothing"},
        {"id":20,"title":"DANVOUY Womens T Shirt Casual Cotton Short","price":12.99,"category":"Women's Clothing"}
    ]"#,
    )
    .expect("catalog fixture decodes")
}

const TERMS: &[&str] = &[
    "", "a", "shirt", "SHIRT", "clothing", "men", "women's", " ", "ssd", "x", "t-s", "&", "zzz",
];

fn ids(list: &[&Product]) -> Vec<ProductId> {
    list.iter().map(|p| p.id.clone()).collect()
}

#[test]
fn test_filter_shirt_scenario() {
    let products = scenario_products();
    let filtered = filter_products(&products, "shirt");
    assert_eq!(ids(&filtered), vec![ProductId::Number(1), ProductId::Number(3)]);
    assert_eq!(
        count_by_category(&filtered),
        vec![CategoryCount::new("clothing", 2)]
    );
}

#[test]
fn test_empty_term_scenario() {
    let products = scenario_products();
    let filtered = filter_products(&products, "");
    assert_eq!(filtered.len(), 3);
    assert_eq!(
        count_by_category(&filtered),
        vec![
            CategoryCount::new("clothing", 2),
            CategoryCount::new("accessories", 1),
        ]
    );
}

#[test]
fn test_filtered_is_ordered_subsequence() {
    let products = store_products();
    for term in TERMS {
        let filtered = filter_products(&products, term);
        let mut source = products.iter();
        for item in &filtered {
            assert!(
                source.any(|p| std::ptr::eq(p, *item)),
                "'{}' broke source order",
                term
            );
        }
    }
}

#[test]
fn test_empty_term_keeps_everything() {
    let products = store_products();
    let filtered = filter_products(&products, "");
    assert_eq!(filtered.len(), products.len());
    assert!(filtered.iter().zip(&products).all(|(a, b)| std::ptr::eq(*a, b)));
}

#[test]
fn test_counts_sum_to_filtered_length() {
    let products = store_products();
    for term in TERMS {
        let filtered = filter_products(&products, term);
        let counts = count_by_category(&filtered);
        assert_eq!(CategoryCount::total(&counts), filtered.len(), "term '{}'", term);
    }
}

#[test]
fn test_counts_have_unique_labels() {
    let products = store_products();
    for term in TERMS {
        let counts = count_by_category(&filter_products(&products, term));
        let labels: HashSet<&str> = counts.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(labels.len(), counts.len());
    }
}

#[test]
fn test_filter_ignores_case_but_grouping_does_not() {
    let products = store_products();
    assert_eq!(
        ids(&filter_products(&products, "SHIRT")),
        ids(&filter_products(&products, "shirt"))
    );

    // "women's clothing" and "Women's Clothing" match the same term but count separately
    let filtered = filter_products(&products, "WOMEN'S CLOTHING");
    assert_eq!(filtered.len(), 3);
    assert_eq!(
        count_by_category(&filtered),
        vec![
            CategoryCount::new("women's clothing", 2),
            CategoryCount::new("Women's Clothing", 1),
        ]
    );
}

#[test]
fn test_category_only_match() {
    let products = store_products();
    let filtered = filter_products(&products, "jewel");
    assert_eq!(ids(&filtered), vec![ProductId::Number(5)]);
}

#[test]
fn test_first_seen_order_follows_filtered_list() {
    let products = store_products();
    let counts = count_by_category(&filter_products(&products, ""));
    let order: Vec<&str> = counts.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "men's clothing",
            "jewelery",
            "electronics",
            "women's clothing",
            "Women's Clothing",
        ]
    );
    assert_eq!(CategoryCount::max(&counts), 2);
}

#[test]
fn test_empty_catalog_derives_nothing() {
    let products: Vec<Product> = Vec::new();
    for term in TERMS {
        let filtered = filter_products(&products, term);
        assert!(filtered.is_empty());
        assert!(count_by_category(&filtered).is_empty());
    }
}
