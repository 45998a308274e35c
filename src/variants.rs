// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Variant overrides: swap prepared intermediates for stocked products
//!
//! A planned meal can replace a product node of its recipe with another
//! product ("use the premade mix instead of roasting"). Applying overrides
//! rewrites the graph: the replaced node keeps its id but points at the new
//! product, its upstream history is cut, and everything that then no longer
//! reaches a terminal output (orphans) is dropped.
//!
//! The input graph is never mutated; every operation returns new data.

use crate::error::GraphError;
use crate::graph::RecipeGraph;
use crate::types::{Product, RecipeGraphData};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// A substitution with its replacement product resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantOverride {
    /// Stored override record id, if it came from the store
    #[serde(default)]
    pub override_id: Option<String>,
    /// Node being replaced
    pub original_node_id: String,
    /// Product used instead
    pub replacement: Product,
}

/// Why an override was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// The node no longer exists in the recipe graph
    MissingNode,
    /// The replacement product no longer exists
    UnknownReplacement,
    /// Another override already replaces the same node
    DuplicateNode,
}

impl InvalidReason {
    /// Human-readable explanation
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::MissingNode => "node no longer exists in the recipe",
            Self::UnknownReplacement => "replacement product no longer exists",
            Self::DuplicateNode => "node is already replaced by another override",
        }
    }
}

/// An override that was skipped, for the caller to warn about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidOverride {
    /// Stored override record id
    pub override_id: Option<String>,
    /// Planned meal the override belongs to, when known
    #[serde(default)]
    pub planned_meal_id: Option<String>,
    /// Node the override named
    pub original_node_id: String,
    /// Why it was skipped
    pub reason: InvalidReason,
}

/// Result of checking overrides against a graph
#[derive(Debug, Clone, Default)]
pub struct OverrideValidation<'o> {
    /// Overrides that can be applied, one per node
    pub valid: Vec<&'o VariantOverride>,
    /// Overrides that were skipped
    pub invalid: Vec<InvalidOverride>,
}

/// Split overrides into applicable and invalid ones.
///
/// The first override naming a node wins; later ones for the same node are
/// reported as duplicates.
#[must_use]
pub fn validate_overrides<'o>(
    graph: &RecipeGraphData,
    overrides: &'o [VariantOverride],
) -> OverrideValidation<'o> {
    let mut validation = OverrideValidation::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for ov in overrides {
        let reason = if graph.node(&ov.original_node_id).is_none() {
            Some(InvalidReason::MissingNode)
        } else if !seen.insert(ov.original_node_id.as_str()) {
            Some(InvalidReason::DuplicateNode)
        } else {
            None
        };

        match reason {
            Some(reason) => validation.invalid.push(InvalidOverride {
                override_id: ov.override_id.clone(),
                planned_meal_id: None,
                original_node_id: ov.original_node_id.clone(),
                reason,
            }),
            None => validation.valid.push(ov),
        }
    }

    validation
}

/// Nodes and steps that no longer reach any terminal output, by position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orphans {
    /// Product node positions, ascending
    pub nodes: Vec<usize>,
    /// Step positions, ascending
    pub steps: Vec<usize>,
}

impl Orphans {
    /// Nothing is orphaned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.steps.is_empty()
    }
}

/// Find everything that stops contributing to a final output once the
/// nodes at `replaced` are sourced externally.
///
/// Walks backwards from every terminal product (a node no step consumes)
/// through its producing steps and their inputs. Replaced nodes are marked
/// when reached but block the walk: their own upstream history is moot.
/// Whatever is left unmarked, other than the replaced nodes themselves, is
/// orphaned.
#[must_use]
pub fn find_orphans(graph: &RecipeGraph<'_>, replaced: &HashSet<usize>) -> Orphans {
    let mut reached_nodes = vec![false; graph.node_count()];
    let mut reached_steps = vec![false; graph.step_count()];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for terminal in graph.terminal_nodes() {
        if !replaced.contains(&terminal) {
            reached_nodes[terminal] = true;
            queue.push_back(terminal);
        }
    }

    while let Some(node) = queue.pop_front() {
        for step in graph.node_producers(node) {
            if reached_steps[step] {
                continue;
            }
            reached_steps[step] = true;
            for input in graph.step_inputs(step) {
                if reached_nodes[input] {
                    continue;
                }
                reached_nodes[input] = true;
                if !replaced.contains(&input) {
                    queue.push_back(input);
                }
            }
        }
    }

    Orphans {
        nodes: (0..graph.node_count())
            .filter(|i| !reached_nodes[*i] && !replaced.contains(i))
            .collect(),
        steps: (0..graph.step_count()).filter(|i| !reached_steps[*i]).collect(),
    }
}

/// Outcome of applying a meal's overrides
#[derive(Debug, Clone, PartialEq)]
pub struct VariantResolution {
    /// The rewritten graph (a copy of the input when nothing applied)
    pub graph: RecipeGraphData,
    /// Ids of nodes whose product was swapped
    pub replaced_nodes: Vec<String>,
    /// Ids of product nodes dropped as orphans
    pub orphaned_nodes: Vec<String>,
    /// Ids of steps dropped as orphans
    pub orphaned_steps: Vec<String>,
    /// Overrides that were skipped
    pub invalid: Vec<InvalidOverride>,
}

/// Rewrite a recipe graph for a set of overrides.
///
/// Invalid overrides are reported, not fatal. With no valid override the
/// result is an unchanged copy of `data`.
pub fn apply_variant_overrides(
    data: &RecipeGraphData,
    overrides: &[VariantOverride],
) -> Result<VariantResolution, GraphError> {
    let validation = validate_overrides(data, overrides);
    for invalid in &validation.invalid {
        warn!(
            recipe = %data.recipe.id,
            node = %invalid.original_node_id,
            "Skipping override: {}",
            invalid.reason.describe()
        );
    }

    if validation.valid.is_empty() {
        return Ok(VariantResolution {
            graph: data.clone(),
            replaced_nodes: vec![],
            orphaned_nodes: vec![],
            orphaned_steps: vec![],
            invalid: validation.invalid,
        });
    }

    let graph = RecipeGraph::build(data)?;

    let replacements: HashMap<usize, &Product> = validation
        .valid
        .iter()
        .filter_map(|ov| {
            graph
                .node_position(&ov.original_node_id)
                .map(|pos| (pos, &ov.replacement))
        })
        .collect();
    let replaced: HashSet<usize> = replacements.keys().copied().collect();

    let orphans = find_orphans(&graph, &replaced);
    let orphan_nodes: HashSet<&str> = orphans
        .nodes
        .iter()
        .map(|&i| graph.node_at(i).id.as_str())
        .collect();
    let orphan_steps: HashSet<&str> = orphans
        .steps
        .iter()
        .map(|&i| graph.step_at(i).id.as_str())
        .collect();
    let replaced_ids: HashSet<&str> = replaced
        .iter()
        .map(|&i| graph.node_at(i).id.as_str())
        .collect();

    let product_nodes = data
        .product_nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| !orphan_nodes.contains(node.id.as_str()))
        .map(|(i, node)| {
            let mut node = node.clone();
            if let Some(product) = replacements.get(&i) {
                node.product = (*product).clone();
            }
            node
        })
        .collect();

    let steps = data
        .steps
        .iter()
        .filter(|s| !orphan_steps.contains(s.id.as_str()))
        .cloned()
        .collect();

    // Edges out of a replaced node still carry the replacement forward.
    let product_to_step_edges = data
        .product_to_step_edges
        .iter()
        .filter(|e| {
            !orphan_nodes.contains(e.product_node_id.as_str())
                && !orphan_steps.contains(e.step_id.as_str())
        })
        .cloned()
        .collect();

    // Nothing produces a replaced node any more; it is sourced externally.
    let step_to_product_edges = data
        .step_to_product_edges
        .iter()
        .filter(|e| {
            !orphan_steps.contains(e.step_id.as_str())
                && !orphan_nodes.contains(e.product_node_id.as_str())
                && !replaced_ids.contains(e.product_node_id.as_str())
        })
        .cloned()
        .collect();

    let mut replaced_nodes: Vec<usize> = replaced.into_iter().collect();
    replaced_nodes.sort_unstable();

    debug!(
        recipe = %data.recipe.id,
        replaced = replaced_nodes.len(),
        orphaned_nodes = orphans.nodes.len(),
        orphaned_steps = orphans.steps.len(),
        "Applied variant overrides"
    );

    Ok(VariantResolution {
        graph: RecipeGraphData {
            recipe: data.recipe.clone(),
            product_nodes,
            steps,
            product_to_step_edges,
            step_to_product_edges,
        },
        replaced_nodes: replaced_nodes
            .into_iter()
            .map(|i| graph.node_at(i).id.clone())
            .collect(),
        orphaned_nodes: orphans
            .nodes
            .iter()
            .map(|&i| graph.node_at(i).id.clone())
            .collect(),
        orphaned_steps: orphans
            .steps
            .iter()
            .map(|&i| graph.step_at(i).id.clone())
            .collect(),
        invalid: validation.invalid,
    })
}

/// Names of everything that would be dropped if `node_id` were replaced.
///
/// Product names come first, then step names, each in graph order. Returns
/// an empty list when the node is not part of the graph.
pub fn preview_orphaned_nodes(
    data: &RecipeGraphData,
    node_id: &str,
) -> Result<Vec<String>, GraphError> {
    let graph = RecipeGraph::build(data)?;
    let Some(position) = graph.node_position(node_id) else {
        return Ok(vec![]);
    };

    let orphans = find_orphans(&graph, &HashSet::from([position]));
    let names = orphans
        .nodes
        .iter()
        .map(|&i| graph.node_at(i).product.name.clone())
        .chain(orphans.steps.iter().map(|&i| graph.step_at(i).name.clone()))
        .collect();

    Ok(names)
}
