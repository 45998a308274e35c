// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Aggregators deriving read-only view models from a week of planned graphs
//!
//! Every aggregator is a pure function of its input slice: graphs are
//! indexed afresh per call and nothing is cached between calls.

pub mod flow;
pub mod products;
pub mod steps;
pub mod storage;

pub use flow::{build_flow_graph, FlowEdge, FlowGraph, FlowNode, FlowNodeKind, FlowQuantity};
pub use products::{
    aggregate_products, shopping_list, AggregatedProduct, PantryCheck, ProductSource,
    ShoppingGroup, ShoppingList, UNASSIGNED,
};
pub use steps::{
    aggregate_steps, prep_list, AggregatedStep, PrepList, RawTotal, StepProduct, StepSignature,
};
pub use storage::{
    pull_lists, ready_to_eat, resolve_storage, MealContainer, PullItem, PullListMeal, PullSource,
    ReadyToEatGroup, StorageGroup, StorageManifest, StoredItem,
};

use crate::error::GraphError;
use crate::graph::RecipeGraph;
use crate::types::PlannedGraph;

/// Index every planned graph, failing on the first malformed one
pub(crate) fn index_all(meals: &[PlannedGraph]) -> Result<Vec<RecipeGraph<'_>>, GraphError> {
    meals.iter().map(|m| RecipeGraph::build(&m.graph)).collect()
}

/// Render a quantity without trailing zeros ("2", "0.5", "1.25")
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    let rounded = (quantity * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Push `value` unless already present, keeping first-seen order
pub(crate) fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}
