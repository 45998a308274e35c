// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Product aggregation: the week's shopping list
//!
//! Raw products consumed by at least one step are summed across every
//! planned meal, keyed by `(product, unit)`. Units are never converted;
//! "2 cups" and "480 ml" of the same product stay separate lines.

use super::index_all;
use crate::error::GraphError;
use crate::types::{PlannedGraph, ProductKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Bucket name for products without a store or section
pub const UNASSIGNED: &str = "Unassigned";

/// One contribution to an aggregated product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSource {
    /// Recipe the quantity comes from
    pub recipe_name: String,
    /// Planned meal the quantity comes from
    pub planned_meal_id: String,
    /// Node quantity times the meal multiplier
    pub quantity: f64,
}

/// A shopping-list line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedProduct {
    /// Product id
    pub product_id: String,
    /// Product name
    pub product_name: String,
    /// Sum of all source quantities
    pub total_quantity: f64,
    /// Unit shared by all sources (empty when unitless)
    pub unit: String,
    /// Kept in the pantry
    pub is_pantry: bool,
    /// Pantry check shows quantities
    pub track_quantity: bool,
    /// Store the product is bought at
    pub store: Option<String>,
    /// Section within the store
    pub section: Option<String>,
    /// Contributions, in planned-meal order
    pub sources: Vec<ProductSource>,
}

/// Non-pantry products bought at one store section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingGroup {
    /// Store name, or [`UNASSIGNED`]
    pub store: String,
    /// Section name, or [`UNASSIGNED`]
    pub section: String,
    /// Lines in this section
    pub items: Vec<AggregatedProduct>,
}

/// A pantry product to check before shopping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryCheck {
    /// Product id
    pub product_id: String,
    /// Product name
    pub product_name: String,
    /// Needed quantity, only for tracked products
    pub quantity: Option<f64>,
    /// Unit, only for tracked products
    pub unit: Option<String>,
}

/// Shopping list with store grouping and pantry checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    /// Every aggregated line, sorted by product name then unit
    pub items: Vec<AggregatedProduct>,
    /// Non-pantry lines grouped by store and section
    pub groups: Vec<ShoppingGroup>,
    /// Pantry products to check
    pub pantry: Vec<PantryCheck>,
}

/// Sum the raw ingredient requirements of every planned meal.
///
/// A node counts when its product is raw and at least one step consumes
/// it. Missing quantities count as zero but still produce a source entry.
pub fn aggregate_products(meals: &[PlannedGraph]) -> Result<Vec<AggregatedProduct>, GraphError> {
    let graphs = index_all(meals)?;
    let mut lines: Vec<AggregatedProduct> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for (planned, graph) in meals.iter().zip(&graphs) {
        let multiplier = planned.meal.multiplier();
        let recipe_name = &planned.graph.recipe.name;

        for (i, node) in planned.graph.product_nodes.iter().enumerate() {
            let ProductKind::Raw {
                pantry,
                track_quantity,
                store,
                section,
            } = &node.product.kind
            else {
                continue;
            };
            if !graph.is_consumed(i) {
                continue;
            }

            let quantity = node.quantity_or_zero() * multiplier;
            let key = (node.product.id.clone(), node.unit_or_empty().to_string());
            let pos = *positions.entry(key).or_insert_with(|| {
                lines.push(AggregatedProduct {
                    product_id: node.product.id.clone(),
                    product_name: node.product.name.clone(),
                    total_quantity: 0.0,
                    unit: node.unit_or_empty().to_string(),
                    is_pantry: *pantry,
                    track_quantity: *track_quantity,
                    store: store.clone(),
                    section: section.clone(),
                    sources: Vec::new(),
                });
                lines.len() - 1
            });

            let line = &mut lines[pos];
            line.total_quantity += quantity;
            line.sources.push(ProductSource {
                recipe_name: recipe_name.clone(),
                planned_meal_id: planned.meal.id.clone(),
                quantity,
            });
        }
    }

    lines.sort_by(|a, b| {
        a.product_name
            .cmp(&b.product_name)
            .then_with(|| a.unit.cmp(&b.unit))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });

    debug!(meals = meals.len(), lines = lines.len(), "Aggregated products");
    Ok(lines)
}

/// Build the full shopping list: lines, store/section groups and pantry checks
pub fn shopping_list(meals: &[PlannedGraph]) -> Result<ShoppingList, GraphError> {
    let items = aggregate_products(meals)?;

    let mut groups: Vec<ShoppingGroup> = Vec::new();
    for item in items.iter().filter(|i| !i.is_pantry) {
        let store = item.store.as_deref().unwrap_or(UNASSIGNED);
        let section = item.section.as_deref().unwrap_or(UNASSIGNED);
        match groups
            .iter_mut()
            .find(|g| g.store == store && g.section == section)
        {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(ShoppingGroup {
                store: store.to_string(),
                section: section.to_string(),
                items: vec![item.clone()],
            }),
        }
    }
    groups.sort_by(|a, b| {
        (a.store == UNASSIGNED, &a.store, a.section == UNASSIGNED, &a.section).cmp(&(
            b.store == UNASSIGNED,
            &b.store,
            b.section == UNASSIGNED,
            &b.section,
        ))
    });

    let pantry = items
        .iter()
        .filter(|i| i.is_pantry)
        .map(|i| PantryCheck {
            product_id: i.product_id.clone(),
            product_name: i.product_name.clone(),
            quantity: i.track_quantity.then_some(i.total_quantity),
            unit: i.track_quantity.then(|| i.unit.clone()),
        })
        .collect();

    Ok(ShoppingList {
        items,
        groups,
        pantry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{
        broccoli_patties_graph, planned_graph, potato_graph, shawarma_graph, GraphBuilder,
    };
    use crate::types::Product;

    fn raw_with(name: &str, pantry: bool, track: bool, store: Option<&str>, section: Option<&str>) -> Product {
        Product {
            id: format!("product-{name}"),
            name: name.into(),
            kind: ProductKind::Raw {
                pantry,
                track_quantity: track,
                store: store.map(String::from),
                section: section.map(String::from),
            },
        }
    }

    #[test]
    fn test_single_meal() {
        let meals = vec![planned_graph("meal-1", &potato_graph(), Some(1.0))];
        let items = aggregate_products(&meals).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "potato");
        assert_eq!(items[0].total_quantity, 2.0);
        assert_eq!(items[0].sources.len(), 1);
        assert_eq!(items[0].sources[0].recipe_name, "Boiled Potatoes");
    }

    #[test]
    fn test_quantities_sum_across_meals() {
        let patties = broccoli_patties_graph();
        let meals = vec![
            planned_graph("meal-1", &patties, None),
            planned_graph("meal-2", &patties, None),
        ];
        let items = aggregate_products(&meals).unwrap();

        let egg = items.iter().find(|i| i.product_name == "egg").unwrap();
        let broccoli = items.iter().find(|i| i.product_name == "broccoli").unwrap();
        assert_eq!(egg.total_quantity, 12.0);
        assert_eq!(broccoli.total_quantity, 2.0);
        assert_eq!(broccoli.unit, "bag");
        assert_eq!(egg.sources.len(), 2);
    }

    #[test]
    fn test_meal_multiplier_applies() {
        let meals = vec![planned_graph("meal-1", &potato_graph(), Some(2.5))];
        let items = aggregate_products(&meals).unwrap();
        assert_eq!(items[0].total_quantity, 5.0);
    }

    #[test]
    fn test_unit_mismatch_stays_separate() {
        let a = GraphBuilder::new("recipe-a", "Soup")
            .raw("n1", "stock", Some(2.0), Some("cup"))
            .transient("n2", "soup")
            .prep("s1", "Simmer", &["n1"], &["n2"])
            .build();
        let b = GraphBuilder::new("recipe-b", "Risotto")
            .raw("n1", "stock", Some(480.0), Some("ml"))
            .transient("n2", "risotto")
            .prep("s1", "Stir", &["n1"], &["n2"])
            .build();
        let meals = vec![planned_graph("m1", &a, None), planned_graph("m2", &b, None)];

        let items = aggregate_products(&meals).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit, "cup");
        assert_eq!(items[1].unit, "ml");
    }

    #[test]
    fn test_missing_quantity_counts_as_zero() {
        let data = GraphBuilder::new("recipe-salt", "Salted")
            .raw("n-salt", "salt", None, None)
            .transient("n-out", "salted")
            .prep("s1", "Season", &["n-salt"], &["n-out"])
            .build();
        let meals = vec![planned_graph("m1", &data, None)];

        let items = aggregate_products(&meals).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_quantity, 0.0);
        assert_eq!(items[0].sources[0].quantity, 0.0);
        assert_eq!(items[0].unit, "");
    }

    #[test]
    fn test_unconsumed_raw_node_excluded() {
        let data = GraphBuilder::new("recipe-x", "Loose")
            .raw("n-lemon", "lemon", Some(1.0), None)
            .build();
        let meals = vec![planned_graph("m1", &data, None)];

        assert!(aggregate_products(&meals).unwrap().is_empty());
    }

    #[test]
    fn test_only_raw_products_listed() {
        let meals = vec![planned_graph("m1", &shawarma_graph(), None)];
        let names: Vec<_> = aggregate_products(&meals)
            .unwrap()
            .into_iter()
            .map(|i| i.product_name)
            .collect();
        assert_eq!(names, vec!["mushroom", "onion", "tortilla"]);
    }

    #[test]
    fn test_empty_week() {
        let list = shopping_list(&[]).unwrap();
        assert!(list.items.is_empty());
        assert!(list.groups.is_empty());
        assert!(list.pantry.is_empty());
    }

    #[test]
    fn test_groups_and_pantry() {
        let data = GraphBuilder::new("recipe-cake", "Cake")
            .node("n-flour", raw_with("flour", true, true, None, None), Some(2.0), Some("cup"))
            .node("n-salt", raw_with("salt", true, false, None, None), Some(1.0), Some("tsp"))
            .node("n-milk", raw_with("milk", false, false, Some("Grocer"), Some("Dairy")), Some(1.0), Some("cup"))
            .node("n-eggs", raw_with("eggs", false, false, Some("Grocer"), Some("Dairy")), Some(3.0), None)
            .node("n-sprinkles", raw_with("sprinkles", false, false, None, None), Some(1.0), None)
            .transient("n-cake", "cake")
            .prep("s-bake", "Bake", &["n-flour", "n-salt", "n-milk", "n-eggs", "n-sprinkles"], &["n-cake"])
            .build();
        let meals = vec![planned_graph("m1", &data, None)];

        let list = shopping_list(&meals).unwrap();

        assert_eq!(list.groups.len(), 2);
        assert_eq!(list.groups[0].store, "Grocer");
        assert_eq!(list.groups[0].section, "Dairy");
        let dairy: Vec<_> = list.groups[0].items.iter().map(|i| i.product_name.as_str()).collect();
        assert_eq!(dairy, vec!["eggs", "milk"]);
        assert_eq!(list.groups[1].store, UNASSIGNED);
        assert_eq!(list.groups[1].items[0].product_name, "sprinkles");

        assert_eq!(list.pantry.len(), 2);
        assert_eq!(list.pantry[0].product_name, "flour");
        assert_eq!(list.pantry[0].quantity, Some(2.0));
        assert_eq!(list.pantry[0].unit.as_deref(), Some("cup"));
        assert_eq!(list.pantry[1].product_name, "salt");
        assert_eq!(list.pantry[1].quantity, None);
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let patties = broccoli_patties_graph();
        let meals = vec![
            planned_graph("m1", &patties, None),
            planned_graph("m2", &shawarma_graph(), Some(2.0)),
        ];

        let first = serde_json::to_string(&shopping_list(&meals).unwrap()).unwrap();
        let second = serde_json::to_string(&shopping_list(&meals).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
