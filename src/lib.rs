// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Mealgraph library - recipe-graph aggregation for weekly meal planning
//!
//! Recipes are stored as bipartite graphs of product nodes and steps. This
//! crate walks those graphs for a planned week and derives shopping lists,
//! batch-prep lists, storage contents, per-meal pull lists and condensed
//! flow diagrams, after rewriting graphs for per-meal variant overrides.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod store;
pub mod variants;
pub mod week;

// Lets the fixtures name the crate the same way from unit and integration tests
#[cfg(test)]
extern crate self as mealgraph;
#[cfg(test)]
pub(crate) mod fixtures;

/// Core data types shared by the store, the graph index and the aggregators
pub mod types {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};
    use std::fmt;

    // =========================================================================
    // Recipes
    // =========================================================================

    /// What a recipe produces
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RecipeType {
        /// Servings for direct consumption
        Meal,
        /// Stored or frozen intermediates for later meals
        BatchPrep,
    }

    /// A recipe record. Owned by the store, never mutated by the aggregators.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Recipe {
        /// Storage-assigned identifier
        pub id: String,
        /// Display name
        pub name: String,
        /// Free-text notes
        #[serde(default)]
        pub notes: Option<String>,
        /// Meal or batch prep
        pub recipe_type: RecipeType,
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Where a stored product lives
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum StorageLocation {
        /// Refrigerator
        Fridge,
        /// Freezer
        Freezer,
        /// Dry storage
        Dry,
    }

    impl StorageLocation {
        /// Lowercase name used in listings
        #[must_use]
        pub fn as_str(&self) -> &'static str {
            match self {
                Self::Fridge => "fridge",
                Self::Freezer => "freezer",
                Self::Dry => "dry",
            }
        }
    }

    impl fmt::Display for StorageLocation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Meal slot within a day
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum MealSlot {
        /// Breakfast
        Breakfast,
        /// Lunch
        Lunch,
        /// Dinner
        Dinner,
        /// Snack
        Snack,
    }

    impl MealSlot {
        /// Lowercase name used in listings
        #[must_use]
        pub fn as_str(&self) -> &'static str {
            match self {
                Self::Breakfast => "breakfast",
                Self::Lunch => "lunch",
                Self::Dinner => "dinner",
                Self::Snack => "snack",
            }
        }
    }

    impl fmt::Display for MealSlot {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Type-specific product attributes, tagged by the record's `type` field
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum ProductKind {
        /// Purchasable ingredient
        Raw {
            /// Kept in the pantry; checked rather than bought
            #[serde(default)]
            pantry: bool,
            /// Pantry check shows quantities
            #[serde(default)]
            track_quantity: bool,
            /// Store the product is bought at
            #[serde(default)]
            store: Option<String>,
            /// Section within the store
            #[serde(default)]
            section: Option<String>,
        },
        /// Intermediate that only exists within one preparation pass
        Transient,
        /// Intermediate placed into a container for later use
        Stored {
            /// Fridge, freezer or dry storage
            storage_location: StorageLocation,
            /// Container the product is kept in
            #[serde(default)]
            container_type: Option<String>,
        },
        /// Long-lived stock item
        Inventory {
            /// Can be eaten without preparation
            #[serde(default)]
            ready_to_eat: bool,
            /// Slot the item is suggested for
            #[serde(default)]
            meal_slot: Option<MealSlot>,
            /// Where the stock is kept (pantry shelf when absent)
            #[serde(default)]
            storage_location: Option<StorageLocation>,
        },
    }

    impl ProductKind {
        /// The record's `type` tag
        #[must_use]
        pub fn label(&self) -> &'static str {
            match self {
                Self::Raw { .. } => "raw",
                Self::Transient => "transient",
                Self::Stored { .. } => "stored",
                Self::Inventory { .. } => "inventory",
            }
        }
    }

    /// A product record
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Product {
        /// Storage-assigned identifier
        pub id: String,
        /// Display name
        pub name: String,
        /// Type and its attributes
        #[serde(flatten)]
        pub kind: ProductKind,
    }

    impl Product {
        /// Is this a purchasable ingredient?
        #[must_use]
        pub fn is_raw(&self) -> bool {
            matches!(self.kind, ProductKind::Raw { .. })
        }
    }

    // =========================================================================
    // Recipe graph records
    // =========================================================================

    /// Layout coordinates used by the editor; ignored by the aggregators
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Position {
        /// X coordinate
        pub x: f64,
        /// Y coordinate
        pub y: f64,
    }

    /// A product instance inside one recipe's graph, as stored
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RecipeProductNode {
        /// Storage-assigned identifier
        pub id: String,
        /// Owning recipe
        pub recipe_id: String,
        /// Referenced product
        pub product_id: String,
        /// Node quantity (raw inputs)
        #[serde(default)]
        pub quantity: Option<f64>,
        /// Node unit (raw inputs)
        #[serde(default)]
        pub unit: Option<String>,
        /// Free-text tag naming the meal this output is destined for
        #[serde(default)]
        pub meal_destination: Option<String>,
        /// Editor position
        #[serde(default)]
        pub position: Option<Position>,
    }

    /// When an assembly step runs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Timing {
        /// Ahead of time, during batch prep
        Batch,
        /// At serving time
        JustInTime,
    }

    /// Step type, tagged by the record's `step_type` field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(tag = "step_type", rename_all = "snake_case")]
    pub enum StepKind {
        /// Preparation; always batch
        Prep,
        /// Assembly with explicit timing
        Assembly {
            /// Batch or just in time
            timing: Timing,
        },
    }

    impl StepKind {
        /// Effective timing
        #[must_use]
        pub fn timing(&self) -> Timing {
            match self {
                Self::Prep => Timing::Batch,
                Self::Assembly { timing } => *timing,
            }
        }

        /// Does this step belong on the batch-prep list?
        #[must_use]
        pub fn is_batch(&self) -> bool {
            self.timing() == Timing::Batch
        }

        /// Is this a just-in-time assembly step?
        #[must_use]
        pub fn is_just_in_time(&self) -> bool {
            self.timing() == Timing::JustInTime
        }

        /// The record's `step_type` tag
        #[must_use]
        pub fn label(&self) -> &'static str {
            match self {
                Self::Prep => "prep",
                Self::Assembly { .. } => "assembly",
            }
        }
    }

    /// A named operation in a recipe graph
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RecipeStep {
        /// Storage-assigned identifier
        pub id: String,
        /// Owning recipe
        pub recipe_id: String,
        /// Display name
        pub name: String,
        /// Prep or assembly
        #[serde(flatten)]
        pub kind: StepKind,
    }

    /// Edge from a product node into the step that consumes it
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProductToStepEdge {
        /// Storage-assigned identifier
        pub id: String,
        /// Owning recipe
        pub recipe_id: String,
        /// Consumed product node
        pub product_node_id: String,
        /// Consuming step
        pub step_id: String,
    }

    /// Edge from a step to the product node it produces
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StepToProductEdge {
        /// Storage-assigned identifier
        pub id: String,
        /// Owning recipe
        pub recipe_id: String,
        /// Producing step
        pub step_id: String,
        /// Produced product node
        pub product_node_id: String,
    }

    // =========================================================================
    // Planning
    // =========================================================================

    /// Day of the week
    #[derive(
        Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
    )]
    #[serde(rename_all = "lowercase")]
    pub enum Day {
        /// Monday
        Monday,
        /// Tuesday
        Tuesday,
        /// Wednesday
        Wednesday,
        /// Thursday
        Thursday,
        /// Friday
        Friday,
        /// Saturday
        Saturday,
        /// Sunday
        Sunday,
    }

    impl Day {
        /// Lowercase name used in listings
        #[must_use]
        pub fn as_str(&self) -> &'static str {
            match self {
                Self::Monday => "monday",
                Self::Tuesday => "tuesday",
                Self::Wednesday => "wednesday",
                Self::Thursday => "thursday",
                Self::Friday => "friday",
                Self::Saturday => "saturday",
                Self::Sunday => "sunday",
            }
        }
    }

    impl fmt::Display for Day {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// A planned week
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct WeeklyPlan {
        /// Storage-assigned identifier
        pub id: String,
        /// Display name
        pub name: String,
        /// First day of the week
        pub week_start: NaiveDate,
    }

    /// One recipe instance scheduled into a weekly plan
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PlannedMeal {
        /// Storage-assigned identifier
        pub id: String,
        /// Owning weekly plan
        pub plan_id: String,
        /// Scheduled recipe
        pub recipe_id: String,
        /// Day (absent = week-spanning)
        #[serde(default)]
        pub day: Option<Day>,
        /// Slot within the day
        #[serde(default)]
        pub meal_slot: Option<MealSlot>,
        /// Servings multiplier (1 when absent)
        #[serde(default)]
        pub quantity: Option<f64>,
    }

    impl PlannedMeal {
        /// Servings multiplier applied to node quantities
        #[must_use]
        pub fn multiplier(&self) -> f64 {
            self.quantity.unwrap_or(1.0)
        }
    }

    /// "Use this stocked product instead of preparing this node" for one planned meal
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MealVariantOverride {
        /// Storage-assigned identifier
        pub id: String,
        /// Planned meal the substitution applies to
        pub planned_meal_id: String,
        /// Node in the recipe graph being replaced
        pub original_node_id: String,
        /// Product used instead
        pub replacement_product_id: String,
    }

    // =========================================================================
    // Graph data (accessor contract)
    // =========================================================================

    /// A product node with its product record expanded
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ProductNode {
        /// Node identifier
        pub id: String,
        /// Referenced product
        pub product: Product,
        /// Node quantity
        #[serde(default)]
        pub quantity: Option<f64>,
        /// Node unit
        #[serde(default)]
        pub unit: Option<String>,
        /// Free-text destination tag
        #[serde(default)]
        pub meal_destination: Option<String>,
    }

    impl ProductNode {
        /// Quantity, zero when missing
        #[must_use]
        pub fn quantity_or_zero(&self) -> f64 {
            self.quantity.unwrap_or(0.0)
        }

        /// Unit, empty when missing
        #[must_use]
        pub fn unit_or_empty(&self) -> &str {
            self.unit.as_deref().unwrap_or("")
        }
    }

    /// Everything the aggregators need about one recipe
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RecipeGraphData {
        /// The recipe
        pub recipe: Recipe,
        /// Product nodes with expanded products
        #[serde(default)]
        pub product_nodes: Vec<ProductNode>,
        /// Steps
        #[serde(default)]
        pub steps: Vec<RecipeStep>,
        /// Consumption edges
        #[serde(default)]
        pub product_to_step_edges: Vec<ProductToStepEdge>,
        /// Production edges
        #[serde(default)]
        pub step_to_product_edges: Vec<StepToProductEdge>,
    }

    impl RecipeGraphData {
        /// Find a product node by id
        #[must_use]
        pub fn node(&self, id: &str) -> Option<&ProductNode> {
            self.product_nodes.iter().find(|n| n.id == id)
        }

        /// Find a step by id
        #[must_use]
        pub fn step(&self, id: &str) -> Option<&RecipeStep> {
            self.steps.iter().find(|s| s.id == id)
        }
    }

    /// A planned meal paired with the (possibly rewritten) graph it aggregates over
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PlannedGraph {
        /// The planned meal
        pub meal: PlannedMeal,
        /// Its recipe graph, overrides applied
        pub graph: RecipeGraphData,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::GraphError;
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
