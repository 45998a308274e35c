// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Record snapshot and the graph data accessor
//!
//! The storage service hands the aggregators immutable snapshots of its
//! flat record tables. [`Snapshot`] holds one such snapshot and implements
//! [`GraphSource`], expanding a recipe's records into [`RecipeGraphData`].

use crate::error::GraphError;
use crate::types::{
    MealVariantOverride, PlannedMeal, Product, ProductKind, ProductNode, ProductToStepEdge, Recipe,
    RecipeGraphData, RecipeProductNode, RecipeStep, StepToProductEdge, WeeklyPlan,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Supplies recipe graphs by recipe id
pub trait GraphSource {
    /// Fetch one recipe's graph with products expanded
    fn graph_data(&self, recipe_id: &str) -> Result<RecipeGraphData, GraphError>;

    /// Look up a product record
    fn product(&self, product_id: &str) -> Option<&Product>;
}

/// Flat record tables as exported by the storage service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All recipes
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    /// All products
    #[serde(default)]
    pub products: Vec<Product>,
    /// All product nodes, across recipes
    #[serde(default)]
    pub product_nodes: Vec<RecipeProductNode>,
    /// All steps, across recipes
    #[serde(default)]
    pub steps: Vec<RecipeStep>,
    /// All consumption edges
    #[serde(default)]
    pub product_to_step_edges: Vec<ProductToStepEdge>,
    /// All production edges
    #[serde(default)]
    pub step_to_product_edges: Vec<StepToProductEdge>,
    /// Weekly plans
    #[serde(default)]
    pub weekly_plans: Vec<WeeklyPlan>,
    /// Planned meals, across plans
    #[serde(default)]
    pub planned_meals: Vec<PlannedMeal>,
    /// Variant overrides, across planned meals
    #[serde(default)]
    pub overrides: Vec<MealVariantOverride>,
}

impl Snapshot {
    /// Load a snapshot from a JSON file; a missing file is an empty snapshot
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No snapshot at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get a recipe by id
    #[must_use]
    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Find a weekly plan by id or name
    #[must_use]
    pub fn plan(&self, id_or_name: &str) -> Option<&WeeklyPlan> {
        self.weekly_plans
            .iter()
            .find(|p| p.id == id_or_name || p.name == id_or_name)
    }

    /// Get a planned meal by id
    #[must_use]
    pub fn planned_meal(&self, id: &str) -> Option<&PlannedMeal> {
        self.planned_meals.iter().find(|m| m.id == id)
    }

    /// Planned meals of one weekly plan, in stored order
    #[must_use]
    pub fn planned_meals_for(&self, plan_id: &str) -> Vec<&PlannedMeal> {
        self.planned_meals
            .iter()
            .filter(|m| m.plan_id == plan_id)
            .collect()
    }

    /// Overrides recorded for one planned meal, in stored order
    #[must_use]
    pub fn overrides_for(&self, planned_meal_id: &str) -> Vec<&MealVariantOverride> {
        self.overrides
            .iter()
            .filter(|o| o.planned_meal_id == planned_meal_id)
            .collect()
    }

    /// Inventory products flagged ready to eat
    #[must_use]
    pub fn ready_to_eat_products(&self) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| matches!(p.kind, ProductKind::Inventory { ready_to_eat: true, .. }))
            .cloned()
            .collect()
    }
}

impl GraphSource for Snapshot {
    fn graph_data(&self, recipe_id: &str) -> Result<RecipeGraphData, GraphError> {
        let recipe = self
            .recipe(recipe_id)
            .cloned()
            .ok_or_else(|| GraphError::UnknownRecipe(recipe_id.to_string()))?;

        let product_nodes = self
            .product_nodes
            .iter()
            .filter(|n| n.recipe_id == recipe_id)
            .map(|n| {
                let product = self
                    .product(&n.product_id)
                    .cloned()
                    .ok_or_else(|| GraphError::UnknownProduct {
                        node_id: n.id.clone(),
                        product_id: n.product_id.clone(),
                    })?;
                Ok(ProductNode {
                    id: n.id.clone(),
                    product,
                    quantity: n.quantity,
                    unit: n.unit.clone(),
                    meal_destination: n.meal_destination.clone(),
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        Ok(RecipeGraphData {
            recipe,
            product_nodes,
            steps: self
                .steps
                .iter()
                .filter(|s| s.recipe_id == recipe_id)
                .cloned()
                .collect(),
            product_to_step_edges: self
                .product_to_step_edges
                .iter()
                .filter(|e| e.recipe_id == recipe_id)
                .cloned()
                .collect(),
            step_to_product_edges: self
                .step_to_product_edges
                .iter()
                .filter(|e| e.recipe_id == recipe_id)
                .cloned()
                .collect(),
        })
    }

    fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}
