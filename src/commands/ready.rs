// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Ready command - always-available inventory options

use super::{load_snapshot, Output};
use crate::aggregate::{ready_to_eat, ReadyToEatGroup};
use crate::config::Config;
use anyhow::Result;

/// Run the ready command
pub fn run(config: &Config, out: &Output) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let groups = ready_to_eat(&snapshot.ready_to_eat_products());

    if out.json {
        return out.print_json(&groups);
    }

    println!("{}", out.heading("Ready to eat"));
    print!("{}", render(&groups, out));
    Ok(())
}

fn render(groups: &[ReadyToEatGroup], out: &Output) -> String {
    if groups.is_empty() {
        return "\nNo ready-to-eat items in inventory.\n".to_string();
    }

    let mut text = String::new();
    for group in groups {
        let title = group
            .meal_slot
            .map_or_else(|| "Any time".to_string(), |slot| capitalize(slot.as_str()));
        text.push('\n');
        text.push_str(&out.heading(&title));
        text.push('\n');
        for product in &group.products {
            text.push_str(&format!("  {}\n", product.name));
        }
    }
    text
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
