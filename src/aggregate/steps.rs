// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Step aggregation: the batch-prep list
//!
//! Batch steps (all prep steps, plus assembly steps timed `batch`) from
//! every planned meal are merged when they share a structural signature:
//! the same input products and the same output products. Product ids are
//! compared rather than node ids, so the same operation in two recipes
//! merges into one line.

use super::{index_all, push_unique};
use crate::error::GraphError;
use crate::graph::RecipeGraph;
use crate::types::{PlannedGraph, ProductNode, StepKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::debug;

/// Sorted input and output product ids of a step
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepSignature {
    /// Input product ids, sorted
    pub inputs: Vec<String>,
    /// Output product ids, sorted
    pub outputs: Vec<String>,
}

impl StepSignature {
    /// Compute the signature of the step at `step`
    #[must_use]
    pub fn of(graph: &RecipeGraph<'_>, step: usize) -> Self {
        let ids = |nodes: Vec<usize>| {
            let mut ids: Vec<String> = nodes
                .into_iter()
                .map(|i| graph.node_at(i).product.id.clone())
                .collect();
            ids.sort();
            ids
        };
        Self {
            inputs: ids(graph.step_inputs(step)),
            outputs: ids(graph.step_outputs(step)),
        }
    }

    /// A step with no edges at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    /// Short deterministic digest
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for id in &self.inputs {
            hasher.update(id.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(b"=>");
        for id in &self.outputs {
            hasher.update(id.as_bytes());
            hasher.update([0u8]);
        }
        let hash = hex::encode(hasher.finalize());
        hash[..12].to_string()
    }
}

/// What merges two step instances
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum MergeKey {
    /// Structural signature
    Signature(StepSignature),
    /// Edge-less step, kept apart from every other
    Unconnected {
        /// Owning recipe
        recipe_id: String,
        /// The step
        step_id: String,
    },
}

impl MergeKey {
    pub(crate) fn of(graph: &RecipeGraph<'_>, step: usize) -> Self {
        let signature = StepSignature::of(graph, step);
        if signature.is_empty() {
            let s = graph.step_at(step);
            Self::Unconnected {
                recipe_id: s.recipe_id.clone(),
                step_id: s.id.clone(),
            }
        } else {
            Self::Signature(signature)
        }
    }

    /// Stable id fragment
    pub(crate) fn digest(&self) -> String {
        match self {
            Self::Signature(sig) => sig.digest(),
            Self::Unconnected { recipe_id, step_id } => {
                let mut hasher = Sha256::new();
                hasher.update(recipe_id.as_bytes());
                hasher.update([0u8]);
                hasher.update(step_id.as_bytes());
                hex::encode(hasher.finalize())[..12].to_string()
            }
        }
    }
}

/// An input or output of an aggregated step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepProduct {
    /// Product id
    pub product_id: String,
    /// Product name
    pub product_name: String,
    /// Product type tag
    pub product_type: String,
    /// Summed quantity
    pub quantity: f64,
    /// Unit (empty when unitless)
    pub unit: String,
}

/// One line of the batch-prep list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStep {
    /// Deterministic id derived from the merge key
    pub key: String,
    /// Step name (first contributor)
    pub name: String,
    /// Prep or assembly, with timing
    pub kind: StepKind,
    /// Contributing recipes, first-seen order
    pub recipe_names: Vec<String>,
    /// Number of step instances merged
    pub instances: usize,
    /// Inputs, sorted by product name then unit
    pub inputs: Vec<StepProduct>,
    /// Outputs, sorted by product name then unit
    pub outputs: Vec<StepProduct>,
}

impl AggregatedStep {
    /// Recipe names joined for display
    #[must_use]
    pub fn recipe_label(&self) -> String {
        self.recipe_names.join(", ")
    }

    fn primary_input(&self) -> Option<&str> {
        self.inputs.first().map(|p| p.product_name.as_str())
    }
}

/// Summed raw quantity across the prep list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTotal {
    /// Product id
    pub product_id: String,
    /// Product name
    pub product_name: String,
    /// Summed quantity
    pub quantity: f64,
    /// Unit (empty when unitless)
    pub unit: String,
}

/// Batch-prep list split by step type, plus the raw pull totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrepList {
    /// Prep steps
    pub prep: Vec<AggregatedStep>,
    /// Batch assembly steps
    pub assembly: Vec<AggregatedStep>,
    /// Raw inputs needed across all listed steps
    pub raw_totals: Vec<RawTotal>,
}

fn accumulate(list: &mut Vec<StepProduct>, node: &ProductNode, multiplier: f64) {
    let quantity = node.quantity_or_zero() * multiplier;
    let unit = node.unit_or_empty();
    match list
        .iter_mut()
        .find(|p| p.product_id == node.product.id && p.unit == unit)
    {
        Some(existing) => existing.quantity += quantity,
        None => list.push(StepProduct {
            product_id: node.product.id.clone(),
            product_name: node.product.name.clone(),
            product_type: node.product.kind.label().to_string(),
            quantity,
            unit: unit.to_string(),
        }),
    }
}

fn sort_products(list: &mut [StepProduct]) {
    list.sort_by(|a, b| {
        a.product_name
            .cmp(&b.product_name)
            .then_with(|| a.unit.cmp(&b.unit))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
}

/// Merge the batch steps of every planned meal.
///
/// Ordered by primary (alphabetically first) input product name, ties
/// broken by step name; steps without inputs come last.
pub fn aggregate_steps(meals: &[PlannedGraph]) -> Result<Vec<AggregatedStep>, GraphError> {
    let graphs = index_all(meals)?;
    let mut merged: Vec<AggregatedStep> = Vec::new();
    let mut positions: HashMap<MergeKey, usize> = HashMap::new();

    for (planned, graph) in meals.iter().zip(&graphs) {
        let multiplier = planned.meal.multiplier();
        let recipe_name = &planned.graph.recipe.name;

        for (i, step) in planned.graph.steps.iter().enumerate() {
            if !step.kind.is_batch() {
                continue;
            }

            let key = MergeKey::of(graph, i);
            let pos = match positions.get(&key) {
                Some(&pos) => pos,
                None => {
                    merged.push(AggregatedStep {
                        key: key.digest(),
                        name: step.name.clone(),
                        kind: step.kind,
                        recipe_names: Vec::new(),
                        instances: 0,
                        inputs: Vec::new(),
                        outputs: Vec::new(),
                    });
                    positions.insert(key, merged.len() - 1);
                    merged.len() - 1
                }
            };

            let entry = &mut merged[pos];
            entry.instances += 1;
            push_unique(&mut entry.recipe_names, recipe_name);
            for input in graph.step_inputs(i) {
                accumulate(&mut entry.inputs, graph.node_at(input), multiplier);
            }
            for output in graph.step_outputs(i) {
                accumulate(&mut entry.outputs, graph.node_at(output), multiplier);
            }
        }
    }

    for entry in &mut merged {
        sort_products(&mut entry.inputs);
        sort_products(&mut entry.outputs);
    }
    merged.sort_by(|a, b| {
        let pa = a.primary_input();
        let pb = b.primary_input();
        (pa.is_none(), pa, &a.name, &a.key).cmp(&(pb.is_none(), pb, &b.name, &b.key))
    });

    debug!(meals = meals.len(), steps = merged.len(), "Aggregated batch steps");
    Ok(merged)
}

/// Build the batch-prep list with prep/assembly split and raw totals
pub fn prep_list(meals: &[PlannedGraph]) -> Result<PrepList, GraphError> {
    let steps = aggregate_steps(meals)?;

    let mut raw_totals: Vec<RawTotal> = Vec::new();
    for input in steps
        .iter()
        .flat_map(|s| &s.inputs)
        .filter(|p| p.product_type == "raw")
    {
        match raw_totals
            .iter_mut()
            .find(|t| t.product_id == input.product_id && t.unit == input.unit)
        {
            Some(total) => total.quantity += input.quantity,
            None => raw_totals.push(RawTotal {
                product_id: input.product_id.clone(),
                product_name: input.product_name.clone(),
                quantity: input.quantity,
                unit: input.unit.clone(),
            }),
        }
    }
    raw_totals.sort_by(|a, b| {
        a.product_name
            .cmp(&b.product_name)
            .then_with(|| a.unit.cmp(&b.unit))
    });

    let (prep, assembly): (Vec<_>, Vec<_>) = steps
        .into_iter()
        .partition(|s| matches!(s.kind, StepKind::Prep));

    Ok(PrepList {
        prep,
        assembly,
        raw_totals,
    })
}
