// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Flow graph: a condensed diagram of one or more planned recipe graphs
//!
//! Product nodes referencing the same product collapse into one visual
//! node; steps sharing a structural signature collapse into one visual
//! step. Parallel edges are deduplicated.
//!
//! Product nodes are layered by their depth within the recipe, so a product
//! that reappears downstream of itself (dough rested into dough) or two
//! recipes converting products into each other never close a loop.

use super::steps::{MergeKey, StepSignature};
use super::{format_quantity, index_all, push_unique};
use crate::error::GraphError;
use crate::graph::{RecipeGraph, Vertex};
use crate::types::{PlannedGraph, StepKind};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

/// Quantity in one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowQuantity {
    /// Summed quantity
    pub quantity: f64,
    /// Unit (empty when unitless)
    pub unit: String,
}

/// What a flow node stands for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type", rename_all = "snake_case")]
pub enum FlowNodeKind {
    /// Merged product nodes
    Product {
        /// Product id
        product_id: String,
        /// Product type tag
        product_type: String,
        /// Summed quantities, one entry per unit
        quantities: Vec<FlowQuantity>,
        /// Destination tags, first-seen order
        meal_destinations: Vec<String>,
    },
    /// Merged steps
    Step {
        /// Prep or assembly, with timing
        kind: StepKind,
        /// Number of step instances merged
        instances: usize,
    },
}

/// A node of the flow diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Deterministic id: `product:<id>`, `product:<id>@<depth>` for a product
    /// found at several depths, or `step:<digest>`
    pub id: String,
    /// Display label
    pub label: String,
    /// Layout column: longest path from any source
    pub column: usize,
    /// Product or step details
    pub kind: FlowNodeKind,
}

/// A directed edge of the flow diagram
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Source node id
    pub from: String,
    /// Target node id
    pub to: String,
}

/// Condensed flow diagram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    /// Nodes in first-seen order
    pub nodes: Vec<FlowNode>,
    /// Edges, sorted
    pub edges: Vec<FlowEdge>,
}

/// Depth of every product node: the longest path from a source, counting
/// products and steps alike. Each recipe edge goes exactly one level deeper.
fn node_depths(graph: &RecipeGraph<'_>) -> Vec<usize> {
    let mut node_depth = vec![0usize; graph.node_count()];
    let mut step_depth = vec![0usize; graph.step_count()];

    for vertex in graph.topological_order() {
        match vertex {
            Vertex::Product(n) => {
                node_depth[n] = graph
                    .node_producers(n)
                    .into_iter()
                    .map(|s| step_depth[s] + 1)
                    .max()
                    .unwrap_or(0);
            }
            Vertex::Step(s) => {
                step_depth[s] = graph
                    .step_inputs(s)
                    .into_iter()
                    .map(|n| node_depth[n] + 1)
                    .max()
                    .unwrap_or(0);
            }
        }
    }
    node_depth
}

/// Flow ids of every product node of every meal.
///
/// Nodes merge on (product, depth). The depth only shows in the id when
/// the product sits at more than one depth this week.
fn product_flow_ids(graphs: &[RecipeGraph<'_>]) -> Vec<Vec<String>> {
    let depths: Vec<Vec<usize>> = graphs.iter().map(node_depths).collect();

    let mut seen_at: HashMap<&str, BTreeSet<usize>> = HashMap::new();
    for (graph, depths) in graphs.iter().zip(&depths) {
        for (n, &depth) in depths.iter().enumerate() {
            seen_at
                .entry(graph.node_at(n).product.id.as_str())
                .or_default()
                .insert(depth);
        }
    }

    graphs
        .iter()
        .zip(&depths)
        .map(|(graph, depths)| {
            depths
                .iter()
                .enumerate()
                .map(|(n, &depth)| {
                    let product_id = graph.node_at(n).product.id.as_str();
                    if seen_at.get(product_id).map_or(0, BTreeSet::len) > 1 {
                        format!("product:{product_id}@{depth}")
                    } else {
                        format!("product:{product_id}")
                    }
                })
                .collect()
        })
        .collect()
}

/// Digest of a step over its neighbours' flow ids
fn step_flow_id(graph: &RecipeGraph<'_>, step: usize, ids: &[String]) -> String {
    let digest = match MergeKey::of(graph, step) {
        MergeKey::Signature(_) => {
            let sorted = |nodes: Vec<usize>| {
                let mut keys: Vec<String> = nodes.into_iter().map(|n| ids[n].clone()).collect();
                keys.sort();
                keys
            };
            StepSignature {
                inputs: sorted(graph.step_inputs(step)),
                outputs: sorted(graph.step_outputs(step)),
            }
            .digest()
        }
        unconnected => unconnected.digest(),
    };
    format!("step:{digest}")
}

/// Merge planned graphs into one flow diagram.
///
/// Every edge leads to a deeper (product, depth) key, so the merged graph
/// is acyclic whenever each recipe is. Malformed recipes fail with the
/// [`GraphError`] from indexing them.
pub fn build_flow_graph(meals: &[PlannedGraph]) -> Result<FlowGraph, GraphError> {
    let graphs = index_all(meals)?;
    let flow_ids = product_flow_ids(&graphs);
    let mut nodes: Vec<FlowNode> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut edges: BTreeSet<FlowEdge> = BTreeSet::new();

    for ((planned, graph), ids) in meals.iter().zip(&graphs).zip(&flow_ids) {
        let multiplier = planned.meal.multiplier();

        for (n, node) in planned.graph.product_nodes.iter().enumerate() {
            let id = ids[n].clone();
            let pos = *positions.entry(id.clone()).or_insert_with(|| {
                nodes.push(FlowNode {
                    id,
                    label: node.product.name.clone(),
                    column: 0,
                    kind: FlowNodeKind::Product {
                        product_id: node.product.id.clone(),
                        product_type: node.product.kind.label().to_string(),
                        quantities: Vec::new(),
                        meal_destinations: Vec::new(),
                    },
                });
                nodes.len() - 1
            });

            if let FlowNodeKind::Product {
                quantities,
                meal_destinations,
                ..
            } = &mut nodes[pos].kind
            {
                if let Some(quantity) = node.quantity {
                    let unit = node.unit_or_empty();
                    match quantities.iter_mut().find(|q| q.unit == unit) {
                        Some(q) => q.quantity += quantity * multiplier,
                        None => quantities.push(FlowQuantity {
                            quantity: quantity * multiplier,
                            unit: unit.to_string(),
                        }),
                    }
                }
                if let Some(dest) = &node.meal_destination {
                    push_unique(meal_destinations, dest);
                }
            }
        }

        for (s, step) in planned.graph.steps.iter().enumerate() {
            let id = step_flow_id(graph, s, ids);
            let pos = *positions.entry(id.clone()).or_insert_with(|| {
                nodes.push(FlowNode {
                    id: id.clone(),
                    label: step.name.clone(),
                    column: 0,
                    kind: FlowNodeKind::Step {
                        kind: step.kind,
                        instances: 0,
                    },
                });
                nodes.len() - 1
            });
            if let FlowNodeKind::Step { instances, .. } = &mut nodes[pos].kind {
                *instances += 1;
            }

            for input in graph.step_inputs(s) {
                edges.insert(FlowEdge {
                    from: ids[input].clone(),
                    to: id.clone(),
                });
            }
            for output in graph.step_outputs(s) {
                edges.insert(FlowEdge {
                    from: id.clone(),
                    to: ids[output].clone(),
                });
            }
        }
    }

    let edges: Vec<FlowEdge> = edges.into_iter().collect();
    assign_columns(&mut nodes, &edges, &positions)?;

    tracing::debug!(
        meals = meals.len(),
        nodes = nodes.len(),
        edges = edges.len(),
        "Built flow graph"
    );
    Ok(FlowGraph { nodes, edges })
}

/// Longest-path layering over the merged graph
fn assign_columns(
    nodes: &mut [FlowNode],
    edges: &[FlowEdge],
    positions: &HashMap<String, usize>,
) -> Result<(), GraphError> {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    for i in 0..nodes.len() {
        graph.add_node(i);
    }
    for edge in edges {
        if let (Some(&from), Some(&to)) = (positions.get(&edge.from), positions.get(&edge.to)) {
            graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
        }
    }

    let order = petgraph::algo::toposort(&graph, None).map_err(|cycle| GraphError::Cycle {
        recipe_id: "flow".into(),
        at: nodes[graph[cycle.node_id()]].id.clone(),
    })?;

    let mut columns = vec![0usize; nodes.len()];
    for ix in order {
        let from = graph[ix];
        for next in graph.neighbors(ix) {
            let to = graph[next];
            columns[to] = columns[to].max(columns[from] + 1);
        }
    }
    for (node, column) in nodes.iter_mut().zip(columns) {
        node.column = column;
    }
    Ok(())
}

impl FlowGraph {
    /// Export to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph flow {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=rounded];\n\n");

        for node in &self.nodes {
            match &node.kind {
                FlowNodeKind::Product { quantities, .. } => {
                    let amounts: Vec<String> = quantities
                        .iter()
                        .map(|q| {
                            let amount = format_quantity(q.quantity);
                            if q.unit.is_empty() {
                                amount
                            } else {
                                format!("{amount} {}", q.unit)
                            }
                        })
                        .collect();
                    let label = if amounts.is_empty() {
                        escape(&node.label)
                    } else {
                        format!("{}\\n{}", escape(&node.label), escape(&amounts.join(", ")))
                    };
                    let _ = writeln!(dot, "  \"{}\" [label=\"{}\"];", escape(&node.id), label);
                }
                FlowNodeKind::Step { kind, instances } => {
                    let label = if *instances > 1 {
                        format!("{} (x{})", escape(&node.label), instances)
                    } else {
                        escape(&node.label)
                    };
                    let style = if kind.is_just_in_time() { ", style=dashed" } else { "" };
                    let _ = writeln!(
                        dot,
                        "  \"{}\" [label=\"{}\", shape=ellipse{}];",
                        escape(&node.id),
                        label,
                        style
                    );
                }
            }
        }

        dot.push('\n');

        for edge in &self.edges {
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\";",
                escape(&edge.from),
                escape(&edge.to)
            );
        }

        dot.push_str("}\n");
        dot
    }

    /// Export to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{broccoli_patties_graph, planned_graph, potato_graph, GraphBuilder};

    fn node<'f>(flow: &'f FlowGraph, id: &str) -> &'f FlowNode {
        flow.nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn test_single_recipe_projection() {
        let meals = vec![planned_graph("m1", &potato_graph(), None)];
        let flow = build_flow_graph(&meals).unwrap();

        assert_eq!(flow.nodes.len(), 5);
        assert_eq!(flow.edges.len(), 4);

        let potato = node(&flow, "product:product-potato");
        assert_eq!(potato.column, 0);
        let boiled = node(&flow, "product:product-potato boiled");
        assert_eq!(boiled.column, 4);
    }

    #[test]
    fn test_instances_merge_and_sum() {
        let patties = broccoli_patties_graph();
        let meals = vec![
            planned_graph("m1", &patties, None),
            planned_graph("m2", &patties, Some(2.0)),
        ];
        let flow = build_flow_graph(&meals).unwrap();

        assert_eq!(flow.nodes.len(), 6);
        assert_eq!(flow.edges.len(), 5);

        let egg = node(&flow, "product:product-egg");
        match &egg.kind {
            FlowNodeKind::Product { quantities, .. } => {
                assert_eq!(quantities.len(), 1);
                assert_eq!(quantities[0].quantity, 18.0);
            }
            FlowNodeKind::Step { .. } => panic!("expected product"),
        }

        let steps: Vec<_> = flow
            .nodes
            .iter()
            .filter_map(|n| match n.kind {
                FlowNodeKind::Step { instances, .. } => Some(instances),
                FlowNodeKind::Product { .. } => None,
            })
            .collect();
        assert_eq!(steps, vec![2, 2]);
    }

    #[test]
    fn test_destinations_concatenated() {
        let mut a = broccoli_patties_graph();
        a.product_nodes[3].meal_destination = Some("Monday lunch".into());
        let mut b = broccoli_patties_graph();
        b.product_nodes[3].meal_destination = Some("Thursday dinner".into());
        let meals = vec![planned_graph("m1", &a, None), planned_graph("m2", &b, None)];

        let flow = build_flow_graph(&meals).unwrap();

        match &node(&flow, "product:product-broccoli patties").kind {
            FlowNodeKind::Product {
                meal_destinations, ..
            } => assert_eq!(meal_destinations, &vec!["Monday lunch", "Thursday dinner"]),
            FlowNodeKind::Step { .. } => panic!("expected product"),
        }
    }

    #[test]
    fn test_cross_recipe_conversions_stay_acyclic() {
        let a = GraphBuilder::new("recipe-a", "A")
            .transient("a1", "x")
            .transient("a2", "y")
            .prep("as", "X to Y", &["a1"], &["a2"])
            .build();
        let b = GraphBuilder::new("recipe-b", "B")
            .transient("b1", "y")
            .transient("b2", "x")
            .prep("bs", "Y to X", &["b1"], &["b2"])
            .build();
        let meals = vec![planned_graph("m1", &a, None), planned_graph("m2", &b, None)];

        let flow = build_flow_graph(&meals).unwrap();

        assert_eq!(flow.nodes.len(), 6);
        assert_eq!(flow.edges.len(), 4);
        assert_eq!(node(&flow, "product:product-x@0").column, 0);
        assert_eq!(node(&flow, "product:product-x@2").column, 2);
        assert_eq!(node(&flow, "product:product-y@2").label, "y");
    }

    #[test]
    fn test_conversion_loop_within_recipe_stays_acyclic() {
        // x -> y on one branch, y -> x on the other
        let data = GraphBuilder::new("recipe-swap", "Swap")
            .transient("x0", "x")
            .transient("y0", "y")
            .transient("y1", "y")
            .transient("x1", "x")
            .prep("to-y", "X to Y", &["x0"], &["y1"])
            .prep("to-x", "Y to X", &["y0"], &["x1"])
            .build();

        let flow = build_flow_graph(&[planned_graph("m1", &data, None)]).unwrap();

        assert_eq!(flow.nodes.len(), 6);
        assert!(flow.nodes.iter().all(|n| n.column <= 2));
    }

    /// flour -> mix -> dough -> rest -> dough -> bake -> bread
    fn bread_graph() -> crate::types::RecipeGraphData {
        GraphBuilder::new("recipe-bread", "Bread")
            .raw("node-flour", "flour", Some(500.0), Some("g"))
            .transient("node-dough", "dough")
            .transient("node-dough-rested", "dough")
            .transient("node-bread", "bread")
            .prep("step-mix", "Mix", &["node-flour"], &["node-dough"])
            .prep("step-rest", "Rest", &["node-dough"], &["node-dough-rested"])
            .prep("step-bake", "Bake", &["node-dough-rested"], &["node-bread"])
            .build()
    }

    #[test]
    fn test_product_feeding_itself_stays_acyclic() {
        let bread = bread_graph();
        let meals = vec![planned_graph("m1", &bread, None), planned_graph("m2", &bread, None)];
        let flow = build_flow_graph(&meals).unwrap();

        assert_eq!(flow.nodes.len(), 7);
        assert_eq!(flow.edges.len(), 6);
        assert_eq!(node(&flow, "product:product-dough@2").column, 2);
        assert_eq!(node(&flow, "product:product-dough@4").column, 4);
        assert_eq!(node(&flow, "product:product-bread").column, 6);
        assert_eq!(node(&flow, "product:product-dough@4").label, "dough");

        let instances: Vec<_> = flow
            .nodes
            .iter()
            .filter_map(|n| match n.kind {
                FlowNodeKind::Step { instances, .. } => Some(instances),
                FlowNodeKind::Product { .. } => None,
            })
            .collect();
        assert_eq!(instances, vec![2, 2, 2]);
    }

    #[test]
    fn test_repeated_rest_steps_stay_apart() {
        let data = GraphBuilder::new("recipe-dough", "Slow dough")
            .transient("d0", "dough")
            .transient("d1", "dough")
            .transient("d2", "dough")
            .prep("rest-1", "Rest", &["d0"], &["d1"])
            .prep("rest-2", "Rest", &["d1"], &["d2"])
            .build();
        let flow = build_flow_graph(&[planned_graph("m1", &data, None)]).unwrap();

        assert_eq!(flow.nodes.len(), 5);
        assert_eq!(node(&flow, "product:product-dough@4").column, 4);
    }

    #[test]
    fn test_single_depth_products_keep_plain_ids() {
        let data = potato_graph();
        let graph = RecipeGraph::build(&data).unwrap();

        assert_eq!(node_depths(&graph), vec![0, 2, 4]);
        assert_eq!(
            product_flow_ids(&[graph]),
            vec![vec![
                "product:product-potato",
                "product:product-potato diced",
                "product:product-potato boiled"
            ]]
        );
    }

    #[test]
    fn test_dot_escapes_ids() {
        let data = GraphBuilder::new("recipe-quote", "Quote")
            .raw("node-in", "say \"hi\"", Some(1.0), None)
            .transient("node-out", "out")
            .prep("step-say", "Say", &["node-in"], &["node-out"])
            .build();
        let flow = build_flow_graph(&[planned_graph("m1", &data, None)]).unwrap();
        let dot = flow.to_dot();

        assert!(dot.contains(r#"  "product:product-say \"hi\"" [label="say \"hi\"\n1"];"#));
        assert!(dot.contains(r#"  "product:product-say \"hi\"" -> "step:"#));
        assert!(!dot.contains(r#""product:product-say "hi"""#));
    }

    #[test]
    fn test_dot_export() {
        let meals = vec![planned_graph("m1", &potato_graph(), None)];
        let flow = build_flow_graph(&meals).unwrap();

        // Step ids are digests; pin them to readable names
        let step_ids: Vec<_> = flow
            .nodes
            .iter()
            .filter(|n| n.id.starts_with("step:"))
            .map(|n| n.id.clone())
            .collect();
        let dot = flow
            .to_dot()
            .replace(&step_ids[0], "step:dice")
            .replace(&step_ids[1], "step:boil");

        assert!(dot.contains("\"product:product-potato\" -> \"step:dice\";"));
        assert!(dot.contains("\"step:dice\" -> \"product:product-potato diced\";"));
        assert!(dot.contains("\"product:product-potato diced\" -> \"step:boil\";"));
        assert!(dot.contains("\"step:boil\" -> \"product:product-potato boiled\";"));
        assert!(dot.ends_with("}\n"));

        let header_and_nodes = dot.split("\n\n").take(2).collect::<Vec<_>>().join("\n\n");
        insta::assert_snapshot!(header_and_nodes, @r###"
        digraph flow {
          rankdir=LR;
          node [shape=box, style=rounded];

          "product:product-potato" [label="potato\n2"];
          "product:product-potato diced" [label="potato diced"];
          "product:product-potato boiled" [label="potato boiled"];
          "step:dice" [label="Dice", shape=ellipse];
          "step:boil" [label="Boil", shape=ellipse];
        "###);
    }

    #[test]
    fn test_json_export() {
        let meals = vec![planned_graph("m1", &potato_graph(), None)];
        let flow = build_flow_graph(&meals).unwrap();

        let json = flow.to_json().unwrap();
        let parsed: FlowGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, flow);
    }
}
