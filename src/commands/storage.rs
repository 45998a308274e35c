// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Storage command - containers filled by batch prep

use super::{load_week, plan_title, quantity_label, Output};
use crate::aggregate::{resolve_storage, StorageManifest, StoredItem};
use crate::config::Config;
use anyhow::Result;

/// Run the storage command
pub fn run(config: &Config, out: &Output, plan: Option<&str>) -> Result<()> {
    let (plan, week) = load_week(config, plan, out)?;
    let manifest = resolve_storage(&week.meals)?;

    if out.json {
        return out.print_json(&manifest);
    }

    println!("{}", plan_title(out, "Storage", &plan));
    print!("{}", render(&manifest, out));
    Ok(())
}

fn render(manifest: &StorageManifest, out: &Output) -> String {
    if manifest.meals.is_empty() {
        return "\nNothing goes into storage this week.\n".to_string();
    }

    let mut text = String::new();
    text.push('\n');
    text.push_str(&out.heading("By recipe"));
    text.push('\n');
    for meal in &manifest.meals {
        text.push_str(&format!("  {}\n", meal.recipe_name));
        for item in &meal.containers {
            text.push_str(&format!("    {}\n", item_line(item, out)));
        }
    }

    for group in &manifest.locations {
        text.push('\n');
        text.push_str(&out.heading(&format!("In the {}", group.location)));
        text.push('\n');
        for item in &group.items {
            text.push_str(&format!("  {}\n", item_line(item, out)));
        }
    }
    text
}

fn item_line(item: &StoredItem, out: &Output) -> String {
    let mut line = item.product_name.clone();
    if item.quantity > 0.0 {
        line.push_str(&format!(" {}", quantity_label(item.quantity, &item.unit)));
    }
    if let Some(container) = &item.container_type {
        let container = if item.instances > 1 {
            format!("{} x {container}", item.instances)
        } else {
            container.clone()
        };
        line.push_str(&format!("  {}", out.muted(&format!("({container})"))));
    }
    if !item.meal_destinations.is_empty() {
        line.push_str(&format!("  -> {}", item.meal_destinations.join(", ")));
    }
    line
}
