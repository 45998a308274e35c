// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Recipe graph builders shared by the unit and integration tests

use mealgraph::store::Snapshot;
use mealgraph::types::{
    MealSlot, PlannedGraph, PlannedMeal, Product, ProductKind, ProductNode, ProductToStepEdge,
    Recipe, RecipeGraphData, RecipeProductNode, RecipeStep, RecipeType, StepKind, StepToProductEdge,
    StorageLocation, Timing,
};

pub fn raw_product(name: &str) -> Product {
    Product {
        id: format!("product-{name}"),
        name: name.into(),
        kind: ProductKind::Raw {
            pantry: false,
            track_quantity: false,
            store: None,
            section: None,
        },
    }
}

pub fn transient_product(name: &str) -> Product {
    Product {
        id: format!("product-{name}"),
        name: name.into(),
        kind: ProductKind::Transient,
    }
}

pub fn stored_product(name: &str, location: StorageLocation, container: Option<&str>) -> Product {
    Product {
        id: format!("product-{name}"),
        name: name.into(),
        kind: ProductKind::Stored {
            storage_location: location,
            container_type: container.map(String::from),
        },
    }
}

pub fn inventory_product(name: &str, ready_to_eat: bool, slot: Option<MealSlot>) -> Product {
    Product {
        id: format!("product-{name}"),
        name: name.into(),
        kind: ProductKind::Inventory {
            ready_to_eat,
            meal_slot: slot,
            storage_location: None,
        },
    }
}

pub fn planned(id: &str, recipe_id: &str, quantity: Option<f64>) -> PlannedMeal {
    PlannedMeal {
        id: id.into(),
        plan_id: "plan-1".into(),
        recipe_id: recipe_id.into(),
        day: None,
        meal_slot: None,
        quantity,
    }
}

pub fn planned_graph(id: &str, graph: &RecipeGraphData, quantity: Option<f64>) -> PlannedGraph {
    PlannedGraph {
        meal: planned(id, &graph.recipe.id, quantity),
        graph: graph.clone(),
    }
}

/// Fluent builder for small recipe graphs
pub struct GraphBuilder {
    data: RecipeGraphData,
}

impl GraphBuilder {
    pub fn new(recipe_id: &str, name: &str) -> Self {
        Self {
            data: RecipeGraphData {
                recipe: Recipe {
                    id: recipe_id.into(),
                    name: name.into(),
                    notes: None,
                    recipe_type: RecipeType::Meal,
                },
                product_nodes: vec![],
                steps: vec![],
                product_to_step_edges: vec![],
                step_to_product_edges: vec![],
            },
        }
    }

    pub fn batch_prep(mut self) -> Self {
        self.data.recipe.recipe_type = RecipeType::BatchPrep;
        self
    }

    pub fn node(mut self, id: &str, product: Product, quantity: Option<f64>, unit: Option<&str>) -> Self {
        self.data.product_nodes.push(ProductNode {
            id: id.into(),
            product,
            quantity,
            unit: unit.map(String::from),
            meal_destination: None,
        });
        self
    }

    pub fn raw(self, id: &str, name: &str, quantity: Option<f64>, unit: Option<&str>) -> Self {
        self.node(id, raw_product(name), quantity, unit)
    }

    pub fn transient(self, id: &str, name: &str) -> Self {
        self.node(id, transient_product(name), None, None)
    }

    pub fn stored(self, id: &str, name: &str, location: StorageLocation, container: Option<&str>) -> Self {
        self.node(id, stored_product(name, location, container), None, None)
    }

    pub fn step(mut self, id: &str, name: &str, kind: StepKind, inputs: &[&str], outputs: &[&str]) -> Self {
        let recipe_id = self.data.recipe.id.clone();
        self.data.steps.push(RecipeStep {
            id: id.into(),
            recipe_id: recipe_id.clone(),
            name: name.into(),
            kind,
        });
        for input in inputs {
            self.data.product_to_step_edges.push(ProductToStepEdge {
                id: format!("{input}->{id}"),
                recipe_id: recipe_id.clone(),
                product_node_id: (*input).into(),
                step_id: id.into(),
            });
        }
        for output in outputs {
            self.data.step_to_product_edges.push(StepToProductEdge {
                id: format!("{id}->{output}"),
                recipe_id: recipe_id.clone(),
                step_id: id.into(),
                product_node_id: (*output).into(),
            });
        }
        self
    }

    pub fn prep(self, id: &str, name: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        self.step(id, name, StepKind::Prep, inputs, outputs)
    }

    pub fn assembly(self, id: &str, name: &str, timing: Timing, inputs: &[&str], outputs: &[&str]) -> Self {
        self.step(id, name, StepKind::Assembly { timing }, inputs, outputs)
    }

    pub fn build(self) -> RecipeGraphData {
        self.data
    }
}

/// potato(2) -> dice -> potato diced -> boil -> potato boiled
pub fn potato_graph() -> RecipeGraphData {
    GraphBuilder::new("recipe-potatoes", "Boiled Potatoes")
        .raw("node-potato", "potato", Some(2.0), None)
        .transient("node-potato-diced", "potato diced")
        .transient("node-potato-boiled", "potato boiled")
        .prep("step-dice", "Dice", &["node-potato"], &["node-potato-diced"])
        .prep("step-boil", "Boil", &["node-potato-diced"], &["node-potato-boiled"])
        .build()
}

/// Batch recipe: egg(6) + broccoli(1 bag) -> mix -> form -> frozen patties
pub fn broccoli_patties_graph() -> RecipeGraphData {
    GraphBuilder::new("recipe-patties", "Broccoli Patties")
        .batch_prep()
        .raw("node-egg", "egg", Some(6.0), None)
        .raw("node-broccoli", "broccoli", Some(1.0), Some("bag"))
        .transient("node-mix", "patty mix")
        .stored("node-patties", "broccoli patties", StorageLocation::Freezer, Some("gallon bag"))
        .prep("step-mix", "Mix", &["node-egg", "node-broccoli"], &["node-mix"])
        .prep("step-form", "Form and bake", &["node-mix"], &["node-patties"])
        .build()
}

/// Wraps whose roasted mushroom filling can be swapped for a premade mix
pub fn shawarma_graph() -> RecipeGraphData {
    GraphBuilder::new("recipe-shawarma", "Mushroom Shawarma Wraps")
        .raw("node-mushroom", "mushroom", Some(8.0), Some("oz"))
        .raw("node-onion", "onion", Some(1.0), None)
        .raw("node-tortilla", "tortilla", Some(4.0), None)
        .transient("node-mushroom-sliced", "mushroom sliced")
        .transient("node-onion-diced", "onion diced")
        .stored(
            "node-mushroom-roasted",
            "mushroom mixture roasted",
            StorageLocation::Fridge,
            Some("quart container"),
        )
        .transient("node-wrap", "shawarma wrap")
        .prep("step-slice", "Slice mushrooms", &["node-mushroom"], &["node-mushroom-sliced"])
        .prep("step-dice", "Dice onion", &["node-onion"], &["node-onion-diced"])
        .prep(
            "step-roast",
            "Roast",
            &["node-mushroom-sliced", "node-onion-diced"],
            &["node-mushroom-roasted"],
        )
        .assembly(
            "step-assemble",
            "Assemble wraps",
            Timing::JustInTime,
            &["node-mushroom-roasted", "node-tortilla"],
            &["node-wrap"],
        )
        .build()
}

/// Flatten graphs back into store records
pub fn snapshot_of(graphs: &[RecipeGraphData]) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for graph in graphs {
        snapshot.recipes.push(graph.recipe.clone());
        snapshot.steps.extend(graph.steps.iter().cloned());
        snapshot
            .product_to_step_edges
            .extend(graph.product_to_step_edges.iter().cloned());
        snapshot
            .step_to_product_edges
            .extend(graph.step_to_product_edges.iter().cloned());
        for node in &graph.product_nodes {
            if !snapshot.products.iter().any(|p| p.id == node.product.id) {
                snapshot.products.push(node.product.clone());
            }
            snapshot.product_nodes.push(RecipeProductNode {
                id: node.id.clone(),
                recipe_id: graph.recipe.id.clone(),
                product_id: node.product.id.clone(),
                quantity: node.quantity,
                unit: node.unit.clone(),
                meal_destination: node.meal_destination.clone(),
                position: None,
            });
        }
    }
    snapshot
}
