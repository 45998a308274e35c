// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Week assembly: planned meals plus their override-rewritten graphs
//!
//! Every aggregator takes `&[PlannedGraph]`. This module builds that list
//! from a [`GraphSource`], fetching each recipe once and running the variant
//! resolver per planned meal.

use crate::error::GraphError;
use crate::store::{GraphSource, Snapshot};
use crate::types::{MealVariantOverride, PlannedGraph, PlannedMeal, RecipeGraphData};
use crate::variants::{apply_variant_overrides, InvalidOverride, InvalidReason, VariantOverride};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A week ready for aggregation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekGraphs {
    /// Planned meals in input order, overrides applied
    pub meals: Vec<PlannedGraph>,
    /// Overrides that were skipped, tagged with their planned meal
    pub invalid_overrides: Vec<InvalidOverride>,
}

/// Resolve graphs for a set of planned meals.
///
/// `overrides` may span several planned meals; each meal only sees its own,
/// in the given order. A missing recipe or malformed graph is fatal; a bad
/// override is reported in `invalid_overrides`.
pub fn prepare_week<S: GraphSource + ?Sized>(
    source: &S,
    meals: &[PlannedMeal],
    overrides: &[MealVariantOverride],
) -> Result<WeekGraphs, GraphError> {
    let mut cache: HashMap<&str, RecipeGraphData> = HashMap::new();
    let mut week = WeekGraphs::default();

    for meal in meals {
        if !cache.contains_key(meal.recipe_id.as_str()) {
            let data = source.graph_data(&meal.recipe_id)?;
            cache.insert(meal.recipe_id.as_str(), data);
        }
        let Some(data) = cache.get(meal.recipe_id.as_str()) else {
            return Err(GraphError::UnknownRecipe(meal.recipe_id.clone()));
        };

        let mut resolved = Vec::new();
        for record in overrides.iter().filter(|o| o.planned_meal_id == meal.id) {
            match source.product(&record.replacement_product_id) {
                Some(product) => resolved.push(VariantOverride {
                    override_id: Some(record.id.clone()),
                    original_node_id: record.original_node_id.clone(),
                    replacement: product.clone(),
                }),
                None => {
                    warn!(
                        meal = %meal.id,
                        product = %record.replacement_product_id,
                        "Skipping override: {}",
                        InvalidReason::UnknownReplacement.describe()
                    );
                    week.invalid_overrides.push(InvalidOverride {
                        override_id: Some(record.id.clone()),
                        planned_meal_id: Some(meal.id.clone()),
                        original_node_id: record.original_node_id.clone(),
                        reason: InvalidReason::UnknownReplacement,
                    });
                }
            }
        }

        let graph = if resolved.is_empty() {
            data.clone()
        } else {
            let resolution = apply_variant_overrides(data, &resolved)?;
            week.invalid_overrides
                .extend(resolution.invalid.into_iter().map(|mut invalid| {
                    invalid.planned_meal_id = Some(meal.id.clone());
                    invalid
                }));
            resolution.graph
        };

        week.meals.push(PlannedGraph {
            meal: meal.clone(),
            graph,
        });
    }

    debug!(
        meals = week.meals.len(),
        recipes = cache.len(),
        invalid = week.invalid_overrides.len(),
        "Prepared week"
    );
    Ok(week)
}

/// Resolve every planned meal of one weekly plan in a snapshot
pub fn prepare_plan(snapshot: &Snapshot, plan_id: &str) -> Result<WeekGraphs, GraphError> {
    let meals: Vec<PlannedMeal> = snapshot
        .planned_meals_for(plan_id)
        .into_iter()
        .cloned()
        .collect();
    let overrides: Vec<MealVariantOverride> = meals
        .iter()
        .flat_map(|meal| snapshot.overrides_for(&meal.id))
        .cloned()
        .collect();
    prepare_week(snapshot, &meals, &overrides)
}
