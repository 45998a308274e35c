// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Shopping command - raw ingredients for the week, grouped by store

use super::{load_week, plan_title, quantity_label, Output};
use crate::aggregate::{push_unique, shopping_list, ShoppingList};
use crate::config::Config;
use anyhow::Result;

/// Run the shopping command
pub fn run(config: &Config, out: &Output, plan: Option<&str>) -> Result<()> {
    let (plan, week) = load_week(config, plan, out)?;
    let list = shopping_list(&week.meals)?;

    if out.json {
        return out.print_json(&list);
    }

    println!("{}", plan_title(out, "Shopping list", &plan));
    print!("{}", render(&list, out));
    Ok(())
}

fn render(list: &ShoppingList, out: &Output) -> String {
    if list.items.is_empty() {
        return "\nNothing to buy.\n".to_string();
    }

    let mut text = String::new();
    for group in &list.groups {
        text.push('\n');
        text.push_str(&out.heading(&format!("{} / {}", group.store, group.section)));
        text.push('\n');
        for item in &group.items {
            let mut recipes: Vec<String> = Vec::new();
            for source in &item.sources {
                push_unique(&mut recipes, &source.recipe_name);
            }
            text.push_str(&format!(
                "  [ ] {}  {}  {}\n",
                item.product_name,
                quantity_label(item.total_quantity, &item.unit),
                out.muted(&format!("({})", recipes.join(", ")))
            ));
        }
    }

    if !list.pantry.is_empty() {
        text.push('\n');
        text.push_str(&out.heading("Pantry check"));
        text.push('\n');
        for check in &list.pantry {
            match check.quantity {
                Some(quantity) => text.push_str(&format!(
                    "  [ ] {}  {}\n",
                    check.product_name,
                    quantity_label(quantity, check.unit.as_deref().unwrap_or(""))
                )),
                None => text.push_str(&format!("  [ ] {}\n", check.product_name)),
            }
        }
    }
    text
}
