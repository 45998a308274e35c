// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Pull command - what to take out before each just-in-time meal

use super::{load_week, plan_title, quantity_label, Output};
use crate::aggregate::{pull_lists, PullListMeal};
use crate::config::Config;
use crate::types::Day;
use anyhow::Result;

/// Run the pull command, optionally for a single day
pub fn run(config: &Config, out: &Output, plan: Option<&str>, day: Option<Day>) -> Result<()> {
    let (plan, week) = load_week(config, plan, out)?;
    let mut lists = pull_lists(&week.meals)?;
    if let Some(day) = day {
        lists.retain(|l| l.day == Some(day));
    }

    if out.json {
        return out.print_json(&lists);
    }

    println!("{}", plan_title(out, "Pull lists", &plan));
    print!("{}", render(&lists, out));
    Ok(())
}

fn render(lists: &[PullListMeal], out: &Output) -> String {
    if lists.is_empty() {
        return "\nNothing to pull.\n".to_string();
    }

    let mut text = String::new();
    for list in lists {
        let when = match (list.day, list.meal_slot) {
            (Some(day), Some(slot)) => format!("{day} {slot}"),
            (Some(day), None) => day.to_string(),
            (None, Some(slot)) => format!("any day, {slot}"),
            (None, None) => "any time".to_string(),
        };
        text.push('\n');
        text.push_str(&out.heading(&format!("{when}: {}", list.recipe_names.join(", "))));
        text.push('\n');
        for item in &list.items {
            let mut line = format!("  [{}] {}", item.source, item.product_name);
            if item.quantity > 0.0 {
                line.push_str(&format!(" {}", quantity_label(item.quantity, &item.unit)));
            }
            if let Some(container) = &item.container_type {
                line.push_str(&format!("  {}", out.muted(&format!("({container})"))));
            }
            text.push_str(&line);
            text.push('\n');
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{planned_graph, shawarma_graph};
    use crate::types::MealSlot;

    #[test]
    fn test_render_slot_heading_and_items() {
        let mut meal = planned_graph("m1", &shawarma_graph(), None);
        meal.meal.day = Some(Day::Tuesday);
        meal.meal.meal_slot = Some(MealSlot::Dinner);
        let lists = pull_lists(&[meal]).unwrap();

        let text = render(&lists, &Output::default());
        assert!(text.contains("tuesday dinner: Mushroom Shawarma Wraps"));
        assert!(text.contains("  [fridge] mushroom mixture roasted  (quart container)"));
    }

    #[test]
    fn test_render_empty() {
        assert!(render(&[], &Output::default()).contains("Nothing to pull."));
    }
}
