// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Validate command - checks every recipe graph and override in the snapshot

use super::{load_snapshot, Output};
use crate::config::Config;
use crate::graph::RecipeGraph;
use crate::store::{GraphSource, Snapshot};
use crate::variants::InvalidOverride;
use crate::week::prepare_plan;
use anyhow::Result;
use serde::Serialize;

/// A record that failed to load or index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    /// Record id
    pub id: String,
    /// What went wrong
    pub error: String,
}

/// Everything wrong with a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Recipes checked
    pub recipes_checked: usize,
    /// Recipes whose graph is malformed
    pub recipes: Vec<Problem>,
    /// Weekly plans that cannot be resolved
    pub plans: Vec<Problem>,
    /// Overrides that would be skipped
    pub overrides: Vec<InvalidOverride>,
    /// Overrides naming a planned meal that does not exist
    pub detached_overrides: Vec<String>,
}

impl ValidationReport {
    /// No problems found?
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.recipes.is_empty()
            && self.plans.is_empty()
            && self.overrides.is_empty()
            && self.detached_overrides.is_empty()
    }
}

/// Check a snapshot
#[must_use]
pub fn check(snapshot: &Snapshot) -> ValidationReport {
    let mut report = ValidationReport::default();

    for recipe in &snapshot.recipes {
        report.recipes_checked += 1;
        let result = snapshot
            .graph_data(&recipe.id)
            .and_then(|data| RecipeGraph::build(&data).map(|_| ()));
        if let Err(e) = result {
            report.recipes.push(Problem {
                id: recipe.id.clone(),
                error: e.to_string(),
            });
        }
    }

    for plan in &snapshot.weekly_plans {
        match prepare_plan(snapshot, &plan.id) {
            Ok(week) => report.overrides.extend(week.invalid_overrides),
            Err(e) => report.plans.push(Problem {
                id: plan.id.clone(),
                error: e.to_string(),
            }),
        }
    }

    report.detached_overrides = snapshot
        .overrides
        .iter()
        .filter(|o| snapshot.planned_meal(&o.planned_meal_id).is_none())
        .map(|o| o.id.clone())
        .collect();

    report
}

/// Run the validate command
pub fn run(config: &Config, out: &Output) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let report = check(&snapshot);

    if out.json {
        out.print_json(&report)?;
    } else {
        for problem in report.recipes.iter().chain(&report.plans) {
            println!("{} {}: {}", out.warning("✗"), problem.id, problem.error);
        }
        for invalid in &report.overrides {
            println!(
                "{} override {}: {}",
                out.warning("✗"),
                invalid.override_id.as_deref().unwrap_or("?"),
                invalid.reason.describe()
            );
        }
        for id in &report.detached_overrides {
            println!("{} override {id}: planned meal no longer exists", out.warning("✗"));
        }
        if report.is_clean() {
            println!("✓ {} recipes valid", report.recipes_checked);
        }
    }

    if !report.is_clean() {
        anyhow::bail!("Snapshot has problems");
    }
    Ok(())
}
