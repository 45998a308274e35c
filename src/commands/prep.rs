// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Prep command - the merged batch-prep list

use super::{load_week, plan_title, quantity_label, Output};
use crate::aggregate::{prep_list, AggregatedStep, PrepList, StepProduct};
use crate::config::Config;
use anyhow::Result;

/// Run the prep command
pub fn run(config: &Config, out: &Output, plan: Option<&str>) -> Result<()> {
    let (plan, week) = load_week(config, plan, out)?;
    let list = prep_list(&week.meals)?;

    if out.json {
        return out.print_json(&list);
    }

    println!("{}", plan_title(out, "Batch prep", &plan));
    print!("{}", render(&list, out));
    Ok(())
}

fn render(list: &PrepList, out: &Output) -> String {
    if list.prep.is_empty() && list.assembly.is_empty() {
        return "\nNo batch steps this week.\n".to_string();
    }

    let mut text = String::new();
    for (title, steps) in [("Prep", &list.prep), ("Batch assembly", &list.assembly)] {
        if steps.is_empty() {
            continue;
        }
        text.push('\n');
        text.push_str(&out.heading(title));
        text.push('\n');
        for step in steps {
            text.push_str(&step_lines(step, out));
        }
    }

    if !list.raw_totals.is_empty() {
        text.push('\n');
        text.push_str(&out.heading("Raw ingredients to pull"));
        text.push('\n');
        for total in &list.raw_totals {
            text.push_str(&format!(
                "  {}  {}\n",
                total.product_name,
                quantity_label(total.quantity, &total.unit)
            ));
        }
    }
    text
}

fn step_lines(step: &AggregatedStep, out: &Output) -> String {
    let count = if step.instances > 1 {
        format!(" (x{})", step.instances)
    } else {
        String::new()
    };
    let mut text = format!(
        "  {}{count}  {}\n",
        step.name,
        out.muted(&format!("[{}]", step.recipe_label()))
    );
    if !step.inputs.is_empty() {
        text.push_str(&format!("      in:  {}\n", products(&step.inputs)));
    }
    if !step.outputs.is_empty() {
        text.push_str(&format!("      out: {}\n", products(&step.outputs)));
    }
    text
}

fn products(list: &[StepProduct]) -> String {
    list.iter()
        .map(|p| {
            if p.quantity > 0.0 {
                format!("{} {}", p.product_name, quantity_label(p.quantity, &p.unit))
            } else {
                p.product_name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{planned_graph, potato_graph};

    #[test]
    fn test_render_merges_instances() {
        let potatoes = potato_graph();
        let meals = vec![
            planned_graph("m1", &potatoes, None),
            planned_graph("m2", &potatoes, None),
        ];
        let list = prep_list(&meals).unwrap();

        let text = render(&list, &Output::default());
        assert!(text.contains("  Dice (x2)  [Boiled Potatoes]"));
        assert!(text.contains("      in:  potato 4"));
        assert!(text.contains("      out: potato diced"));
        assert!(text.contains("Raw ingredients to pull"));
        assert!(!text.contains("Batch assembly"));
    }

    #[test]
    fn test_render_empty() {
        let text = render(&PrepList::default(), &Output::default());
        assert!(text.contains("No batch steps this week."));
    }
}
