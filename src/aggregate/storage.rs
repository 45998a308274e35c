// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Storage resolution: containers, storage inventory and pull lists

use super::{index_all, push_unique};
use crate::error::GraphError;
use crate::types::{
    Day, MealSlot, PlannedGraph, Product, ProductKind, ProductNode, StorageLocation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A stored product produced by batch prep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    /// Product id
    pub product_id: String,
    /// Product name
    pub product_name: String,
    /// Where it is kept (from the product record)
    pub storage_location: StorageLocation,
    /// Container it is kept in (from the product record)
    pub container_type: Option<String>,
    /// Summed node quantity
    pub quantity: f64,
    /// Unit (empty when unitless)
    pub unit: String,
    /// Number of output nodes merged into this item
    pub instances: usize,
    /// Recipes producing it
    pub recipe_names: Vec<String>,
    /// Destination tags from the producing nodes
    pub meal_destinations: Vec<String>,
}

/// Container manifest for one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealContainer {
    /// Recipe name
    pub recipe_name: String,
    /// Containers the recipe fills
    pub containers: Vec<StoredItem>,
}

/// Everything kept in one storage location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageGroup {
    /// Fridge, freezer or dry
    pub location: StorageLocation,
    /// Items, sorted by name
    pub items: Vec<StoredItem>,
}

/// Containers per recipe and per storage location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageManifest {
    /// Per-recipe manifests, sorted by recipe name
    pub meals: Vec<MealContainer>,
    /// Per-location inventory (fridge, freezer, dry)
    pub locations: Vec<StorageGroup>,
}

/// Where an item is pulled from before serving
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullSource {
    /// Refrigerator
    Fridge,
    /// Freezer
    Freezer,
    /// Dry storage
    Dry,
    /// Pantry shelf
    Pantry,
}

impl From<StorageLocation> for PullSource {
    fn from(location: StorageLocation) -> Self {
        match location {
            StorageLocation::Fridge => Self::Fridge,
            StorageLocation::Freezer => Self::Freezer,
            StorageLocation::Dry => Self::Dry,
        }
    }
}

impl fmt::Display for PullSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fridge => "fridge",
            Self::Freezer => "freezer",
            Self::Dry => "dry",
            Self::Pantry => "pantry",
        })
    }
}

/// Something to take out before a just-in-time assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullItem {
    /// Product id
    pub product_id: String,
    /// Product name
    pub product_name: String,
    /// Where to pull it from
    pub source: PullSource,
    /// Container it is kept in
    pub container_type: Option<String>,
    /// Summed quantity
    pub quantity: f64,
    /// Unit (empty when unitless)
    pub unit: String,
}

/// Pull list for one day and slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullListMeal {
    /// Day (absent = week-spanning)
    pub day: Option<Day>,
    /// Slot
    pub meal_slot: Option<MealSlot>,
    /// Recipes assembled in this slot
    pub recipe_names: Vec<String>,
    /// Items to pull, sorted by source then name
    pub items: Vec<PullItem>,
}

/// Ready-to-eat inventory suggested for one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyToEatGroup {
    /// Slot (absent = any time)
    pub meal_slot: Option<MealSlot>,
    /// Products, sorted by name
    pub products: Vec<Product>,
}

fn add_stored(items: &mut Vec<StoredItem>, node: &ProductNode, multiplier: f64, recipe_name: &str) {
    let ProductKind::Stored {
        storage_location,
        container_type,
    } = &node.product.kind
    else {
        return;
    };
    let quantity = node.quantity_or_zero() * multiplier;
    let unit = node.unit_or_empty();

    let pos = match items
        .iter()
        .position(|i| i.product_id == node.product.id && i.unit == unit)
    {
        Some(pos) => pos,
        None => {
            items.push(StoredItem {
                product_id: node.product.id.clone(),
                product_name: node.product.name.clone(),
                storage_location: *storage_location,
                container_type: container_type.clone(),
                quantity: 0.0,
                unit: unit.to_string(),
                instances: 0,
                recipe_names: Vec::new(),
                meal_destinations: Vec::new(),
            });
            items.len() - 1
        }
    };

    let item = &mut items[pos];
    item.quantity += quantity;
    item.instances += 1;
    push_unique(&mut item.recipe_names, recipe_name);
    if let Some(dest) = &node.meal_destination {
        push_unique(&mut item.meal_destinations, dest);
    }
}

fn sort_items(items: &mut [StoredItem]) {
    items.sort_by(|a, b| {
        a.product_name
            .cmp(&b.product_name)
            .then_with(|| a.unit.cmp(&b.unit))
    });
}

/// Resolve the stored outputs of every planned meal.
///
/// A node qualifies when some step produces it and its product is
/// `stored`; location and container come from the product record.
pub fn resolve_storage(meals: &[PlannedGraph]) -> Result<StorageManifest, GraphError> {
    let graphs = index_all(meals)?;
    let mut by_recipe: Vec<MealContainer> = Vec::new();
    let mut flat: Vec<StoredItem> = Vec::new();

    for (planned, graph) in meals.iter().zip(&graphs) {
        let recipe_name = planned.graph.recipe.name.as_str();
        let multiplier = planned.meal.multiplier();

        for (i, node) in planned.graph.product_nodes.iter().enumerate() {
            if !graph.is_produced(i) || !matches!(node.product.kind, ProductKind::Stored { .. }) {
                continue;
            }

            let manifest = match by_recipe.iter().position(|m| m.recipe_name == recipe_name) {
                Some(pos) => &mut by_recipe[pos],
                None => {
                    by_recipe.push(MealContainer {
                        recipe_name: recipe_name.to_string(),
                        containers: Vec::new(),
                    });
                    let last = by_recipe.len() - 1;
                    &mut by_recipe[last]
                }
            };
            add_stored(&mut manifest.containers, node, multiplier, recipe_name);
            add_stored(&mut flat, node, multiplier, recipe_name);
        }
    }

    by_recipe.sort_by(|a, b| a.recipe_name.cmp(&b.recipe_name));
    for manifest in &mut by_recipe {
        sort_items(&mut manifest.containers);
    }

    let mut locations: Vec<StorageGroup> = Vec::new();
    for location in [StorageLocation::Fridge, StorageLocation::Freezer, StorageLocation::Dry] {
        let mut items: Vec<StoredItem> = flat
            .iter()
            .filter(|i| i.storage_location == location)
            .cloned()
            .collect();
        if items.is_empty() {
            continue;
        }
        sort_items(&mut items);
        locations.push(StorageGroup { location, items });
    }

    debug!(meals = by_recipe.len(), items = flat.len(), "Resolved storage");
    Ok(StorageManifest {
        meals: by_recipe,
        locations,
    })
}

fn pull_source(kind: &ProductKind) -> Option<(PullSource, Option<String>)> {
    match kind {
        ProductKind::Stored {
            storage_location,
            container_type,
        } => Some(((*storage_location).into(), container_type.clone())),
        ProductKind::Inventory {
            storage_location, ..
        } => Some((
            storage_location.map_or(PullSource::Pantry, PullSource::from),
            None,
        )),
        ProductKind::Raw { .. } | ProductKind::Transient => None,
    }
}

/// Build per-meal pull lists for just-in-time assembly.
///
/// Every stored or inventory input of a just-in-time assembly step is
/// listed under its planned meal's `(day, slot)`. Ordered by day then slot;
/// week-spanning meals come last.
pub fn pull_lists(meals: &[PlannedGraph]) -> Result<Vec<PullListMeal>, GraphError> {
    let graphs = index_all(meals)?;
    let mut lists: Vec<PullListMeal> = Vec::new();

    for (planned, graph) in meals.iter().zip(&graphs) {
        let multiplier = planned.meal.multiplier();
        let recipe_name = planned.graph.recipe.name.as_str();

        for (s, step) in planned.graph.steps.iter().enumerate() {
            if !step.kind.is_just_in_time() {
                continue;
            }

            let pos = match lists
                .iter()
                .position(|l| l.day == planned.meal.day && l.meal_slot == planned.meal.meal_slot)
            {
                Some(pos) => pos,
                None => {
                    lists.push(PullListMeal {
                        day: planned.meal.day,
                        meal_slot: planned.meal.meal_slot,
                        recipe_names: Vec::new(),
                        items: Vec::new(),
                    });
                    lists.len() - 1
                }
            };
            let list = &mut lists[pos];
            push_unique(&mut list.recipe_names, recipe_name);

            for input in graph.step_inputs(s) {
                let node = graph.node_at(input);
                let Some((source, container_type)) = pull_source(&node.product.kind) else {
                    continue;
                };
                let quantity = node.quantity_or_zero() * multiplier;
                let unit = node.unit_or_empty();
                match list
                    .items
                    .iter_mut()
                    .find(|i| i.product_id == node.product.id && i.unit == unit)
                {
                    Some(item) => item.quantity += quantity,
                    None => list.items.push(PullItem {
                        product_id: node.product.id.clone(),
                        product_name: node.product.name.clone(),
                        source,
                        container_type,
                        quantity,
                        unit: unit.to_string(),
                    }),
                }
            }
        }
    }

    for list in &mut lists {
        list.items.sort_by(|a, b| {
            (a.source, &a.product_name, &a.unit).cmp(&(b.source, &b.product_name, &b.unit))
        });
    }
    lists.sort_by_key(|l| (l.day.is_none(), l.day, l.meal_slot.is_none(), l.meal_slot));

    debug!(lists = lists.len(), "Built pull lists");
    Ok(lists)
}

/// Group ready-to-eat inventory products by suggested slot.
///
/// Not derived from any graph: these are always-available options.
/// Slotted groups come first in slot order; unslotted items last.
#[must_use]
pub fn ready_to_eat(products: &[Product]) -> Vec<ReadyToEatGroup> {
    let mut groups: Vec<ReadyToEatGroup> = Vec::new();

    for product in products {
        let ProductKind::Inventory {
            ready_to_eat: true,
            meal_slot,
            ..
        } = &product.kind
        else {
            continue;
        };
        match groups.iter_mut().find(|g| g.meal_slot == *meal_slot) {
            Some(group) => group.products.push(product.clone()),
            None => groups.push(ReadyToEatGroup {
                meal_slot: *meal_slot,
                products: vec![product.clone()],
            }),
        }
    }

    for group in &mut groups {
        group.products.sort_by(|a, b| a.name.cmp(&b.name));
    }
    groups.sort_by_key(|g| (g.meal_slot.is_none(), g.meal_slot));
    groups
}
