// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Errors raised by the graph index and the graph data accessor

use thiserror::Error;

/// Errors that can occur while fetching or indexing a recipe graph.
///
/// Aggregation itself is total over well-formed graphs; these variants
/// cover graphs that violate the DAG and referential invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The requested recipe does not exist in the store.
    #[error("Recipe not found: {0}")]
    UnknownRecipe(String),

    /// A product node references a product the store does not have.
    #[error("Product {product_id} referenced by node {node_id} not found")]
    UnknownProduct {
        /// Referencing node
        node_id: String,
        /// Missing product
        product_id: String,
    },

    /// An edge names a node or step that is not part of the graph.
    #[error("Edge {edge_id} in recipe {recipe_id} references missing {missing}")]
    DanglingEdge {
        /// Owning recipe
        recipe_id: String,
        /// Offending edge
        edge_id: String,
        /// Id of the missing endpoint
        missing: String,
    },

    /// Two nodes or steps share an id.
    #[error("Duplicate id {id} in recipe {recipe_id}")]
    DuplicateId {
        /// Owning recipe
        recipe_id: String,
        /// Repeated id
        id: String,
    },

    /// The product/step graph contains a cycle.
    #[error("Cycle detected in recipe {recipe_id} at {at}")]
    Cycle {
        /// Owning recipe (or merged flow graph)
        recipe_id: String,
        /// A node or step on the cycle
        at: String,
    },
}
