// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Preview command - what a substitution would drop from a recipe

use super::{load_snapshot, Output};
use crate::config::Config;
use crate::store::GraphSource;
use crate::variants::preview_orphaned_nodes;
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
struct Preview<'a> {
    recipe_id: &'a str,
    node_id: &'a str,
    node_name: &'a str,
    dropped: Vec<String>,
}

/// Run the preview command
pub fn run(config: &Config, out: &Output, recipe_id: &str, node_id: &str) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let data = snapshot
        .graph_data(recipe_id)
        .with_context(|| format!("Failed to load recipe {recipe_id}"))?;
    let node = data
        .node(node_id)
        .ok_or_else(|| anyhow::anyhow!("Unknown node {node_id} in recipe {}", data.recipe.name))?;

    let dropped = preview_orphaned_nodes(&data, node_id)?;

    if out.json {
        return out.print_json(&Preview {
            recipe_id,
            node_id,
            node_name: &node.product.name,
            dropped,
        });
    }

    println!(
        "{}",
        out.heading(&format!(
            "Replacing {} in {}",
            node.product.name, data.recipe.name
        ))
    );
    if dropped.is_empty() {
        println!("Nothing else would be dropped.");
    } else {
        println!("Would drop:");
        for name in &dropped {
            println!("  - {name}");
        }
    }
    Ok(())
}
