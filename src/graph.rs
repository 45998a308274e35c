// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph index over one recipe's product nodes and steps
//!
//! The store keeps two flat edge tables. Aggregators work on a
//! [`RecipeGraph`], which indexes a [`RecipeGraphData`] once into a petgraph
//! `DiGraph` so adjacency lookups don't rescan the edge lists.

use crate::error::GraphError;
use crate::types::{ProductNode, RecipeGraphData, RecipeStep};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// A vertex of the bipartite recipe graph, by position in the source data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vertex {
    /// Index into `product_nodes`
    Product(usize),
    /// Index into `steps`
    Step(usize),
}

/// Indexed, validated view of a [`RecipeGraphData`]
pub struct RecipeGraph<'a> {
    data: &'a RecipeGraphData,
    /// Products occupy indices `0..n`, steps `n..n+m`
    graph: DiGraph<Vertex, ()>,
    node_positions: HashMap<&'a str, usize>,
}

impl<'a> RecipeGraph<'a> {
    /// Index a recipe graph, rejecting duplicate ids, dangling edges and cycles
    pub fn build(data: &'a RecipeGraphData) -> Result<Self, GraphError> {
        let recipe_id = &data.recipe.id;
        let mut graph = DiGraph::with_capacity(
            data.product_nodes.len() + data.steps.len(),
            data.product_to_step_edges.len() + data.step_to_product_edges.len(),
        );
        let mut node_positions = HashMap::with_capacity(data.product_nodes.len());
        let mut step_positions = HashMap::with_capacity(data.steps.len());

        for (i, node) in data.product_nodes.iter().enumerate() {
            if node_positions.insert(node.id.as_str(), i).is_some() {
                return Err(GraphError::DuplicateId {
                    recipe_id: recipe_id.clone(),
                    id: node.id.clone(),
                });
            }
            graph.add_node(Vertex::Product(i));
        }
        for (i, step) in data.steps.iter().enumerate() {
            if node_positions.contains_key(step.id.as_str())
                || step_positions.insert(step.id.as_str(), i).is_some()
            {
                return Err(GraphError::DuplicateId {
                    recipe_id: recipe_id.clone(),
                    id: step.id.clone(),
                });
            }
            graph.add_node(Vertex::Step(i));
        }

        let offset = data.product_nodes.len();
        let dangling = |edge_id: &str, missing: &str| GraphError::DanglingEdge {
            recipe_id: recipe_id.clone(),
            edge_id: edge_id.to_string(),
            missing: missing.to_string(),
        };

        for edge in &data.product_to_step_edges {
            let from = *node_positions
                .get(edge.product_node_id.as_str())
                .ok_or_else(|| dangling(&edge.id, &edge.product_node_id))?;
            let to = *step_positions
                .get(edge.step_id.as_str())
                .ok_or_else(|| dangling(&edge.id, &edge.step_id))?;
            graph.update_edge(NodeIndex::new(from), NodeIndex::new(offset + to), ());
        }
        for edge in &data.step_to_product_edges {
            let from = *step_positions
                .get(edge.step_id.as_str())
                .ok_or_else(|| dangling(&edge.id, &edge.step_id))?;
            let to = *node_positions
                .get(edge.product_node_id.as_str())
                .ok_or_else(|| dangling(&edge.id, &edge.product_node_id))?;
            graph.update_edge(NodeIndex::new(offset + from), NodeIndex::new(to), ());
        }

        let indexed = Self {
            data,
            graph,
            node_positions,
        };

        if let Err(cycle) = petgraph::algo::toposort(&indexed.graph, None) {
            return Err(GraphError::Cycle {
                recipe_id: recipe_id.clone(),
                at: indexed.vertex_id(indexed.graph[cycle.node_id()]).to_string(),
            });
        }

        tracing::trace!(
            recipe = %recipe_id,
            nodes = data.product_nodes.len(),
            steps = data.steps.len(),
            "Indexed recipe graph"
        );

        Ok(indexed)
    }

    /// Product node at a position
    #[must_use]
    pub fn node_at(&self, i: usize) -> &'a ProductNode {
        &self.data.product_nodes[i]
    }

    /// Step at a position
    #[must_use]
    pub fn step_at(&self, i: usize) -> &'a RecipeStep {
        &self.data.steps[i]
    }

    /// Position of a product node by id
    #[must_use]
    pub fn node_position(&self, id: &str) -> Option<usize> {
        self.node_positions.get(id).copied()
    }

    /// Number of product nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.data.product_nodes.len()
    }

    /// Number of steps
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.data.steps.len()
    }

    /// Steps that produce the node at `node`
    #[must_use]
    pub fn node_producers(&self, node: usize) -> Vec<usize> {
        self.step_neighbors(NodeIndex::new(node), Direction::Incoming)
    }

    /// Product nodes feeding the step at `step`
    #[must_use]
    pub fn step_inputs(&self, step: usize) -> Vec<usize> {
        self.product_neighbors(self.step_index(step), Direction::Incoming)
    }

    /// Product nodes produced by the step at `step`
    #[must_use]
    pub fn step_outputs(&self, step: usize) -> Vec<usize> {
        self.product_neighbors(self.step_index(step), Direction::Outgoing)
    }

    /// Is the node consumed by at least one step?
    #[must_use]
    pub fn is_consumed(&self, node: usize) -> bool {
        self.graph
            .neighbors_directed(NodeIndex::new(node), Direction::Outgoing)
            .next()
            .is_some()
    }

    /// Is the node produced by at least one step?
    #[must_use]
    pub fn is_produced(&self, node: usize) -> bool {
        self.graph
            .neighbors_directed(NodeIndex::new(node), Direction::Incoming)
            .next()
            .is_some()
    }

    /// Nodes nothing consumes further: the graph's final outputs
    #[must_use]
    pub fn terminal_nodes(&self) -> Vec<usize> {
        (0..self.node_count()).filter(|&i| !self.is_consumed(i)).collect()
    }

    /// All vertices, producers before consumers
    #[must_use]
    pub fn topological_order(&self) -> Vec<Vertex> {
        // build() already rejected cycles
        petgraph::algo::toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|i| self.graph[i]).collect())
            .unwrap_or_default()
    }

    fn step_index(&self, step: usize) -> NodeIndex {
        NodeIndex::new(self.node_count() + step)
    }

    fn vertex_id(&self, vertex: Vertex) -> &'a str {
        match vertex {
            Vertex::Product(i) => &self.node_at(i).id,
            Vertex::Step(i) => &self.step_at(i).id,
        }
    }

    /// Neighbours in source order, each listed once
    fn sorted_neighbors(&self, ix: NodeIndex, dir: Direction) -> Vec<Vertex> {
        let mut indices: Vec<NodeIndex> = self.graph.neighbors_directed(ix, dir).collect();
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|n| self.graph[n]).collect()
    }

    fn step_neighbors(&self, ix: NodeIndex, dir: Direction) -> Vec<usize> {
        self.sorted_neighbors(ix, dir)
            .into_iter()
            .filter_map(|v| match v {
                Vertex::Step(i) => Some(i),
                Vertex::Product(_) => None,
            })
            .collect()
    }

    fn product_neighbors(&self, ix: NodeIndex, dir: Direction) -> Vec<usize> {
        self.sorted_neighbors(ix, dir)
            .into_iter()
            .filter_map(|v| match v {
                Vertex::Product(i) => Some(i),
                Vertex::Step(_) => None,
            })
            .collect()
    }
}
