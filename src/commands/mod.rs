// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod flow;
pub mod preview;
pub mod prep;
pub mod pull;
pub mod ready;
pub mod shopping;
pub mod storage;
pub mod validate;

use crate::aggregate::format_quantity;
use crate::config::Config;
use crate::store::Snapshot;
use crate::types::WeeklyPlan;
use crate::week::{prepare_plan, WeekGraphs};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::info;

/// How results are printed
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print JSON instead of text
    pub json: bool,
    /// Use ANSI colors in text output
    pub color: bool,
}

impl Output {
    /// Print a value as pretty JSON
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{json}");
        Ok(())
    }

    /// Section heading
    #[must_use]
    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Secondary detail
    #[must_use]
    pub fn muted(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Warning line
    #[must_use]
    pub fn warning(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }
}

/// "2 oz", or just "2" when unitless
#[must_use]
pub fn quantity_label(quantity: f64, unit: &str) -> String {
    if unit.is_empty() {
        format_quantity(quantity)
    } else {
        format!("{} {unit}", format_quantity(quantity))
    }
}

/// Load the snapshot for the configured environment
pub fn load_snapshot(config: &Config) -> Result<Snapshot> {
    let path = config.snapshot_path();
    info!("Loading snapshot from {}", path.display());
    Snapshot::load(&path)
}

/// Pick a weekly plan by id or name, or the latest one
pub fn select_plan<'s>(snapshot: &'s Snapshot, plan: Option<&str>) -> Result<&'s WeeklyPlan> {
    match plan {
        Some(key) => snapshot
            .plan(key)
            .ok_or_else(|| anyhow::anyhow!("Unknown weekly plan: {key}")),
        None => snapshot
            .weekly_plans
            .iter()
            .max_by_key(|p| p.week_start)
            .ok_or_else(|| anyhow::anyhow!("No weekly plans in snapshot")),
    }
}

/// Load a plan's week with overrides applied, warning about skipped overrides
pub fn load_week(config: &Config, plan: Option<&str>, out: &Output) -> Result<(WeeklyPlan, WeekGraphs)> {
    let snapshot = load_snapshot(config)?;
    let plan = select_plan(&snapshot, plan)?.clone();
    let week = prepare_plan(&snapshot, &plan.id)
        .with_context(|| format!("Failed to resolve weekly plan {}", plan.name))?;

    for invalid in &week.invalid_overrides {
        let line = format!(
            "Warning: override {} for meal {} skipped: {}",
            invalid.override_id.as_deref().unwrap_or("?"),
            invalid.planned_meal_id.as_deref().unwrap_or("?"),
            invalid.reason.describe()
        );
        eprintln!("{}", out.warning(&line));
    }

    info!("Loaded {} planned meals for {}", week.meals.len(), plan.name);
    Ok((plan, week))
}

/// Title line naming the plan and its week
#[must_use]
pub fn plan_title(out: &Output, title: &str, plan: &WeeklyPlan) -> String {
    out.heading(&format!(
        "{title}: {} (week of {})",
        plan.name,
        plan.week_start.format("%Y-%m-%d")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn plan(id: &str, start: (i32, u32, u32)) -> WeeklyPlan {
        WeeklyPlan {
            id: id.into(),
            name: format!("Week {id}"),
            week_start: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
        }
    }

    #[test]
    fn test_quantity_label() {
        assert_eq!(quantity_label(2.0, ""), "2");
        assert_eq!(quantity_label(1.5, "cup"), "1.5 cup");
    }

    #[test]
    fn test_select_plan() {
        let snapshot = Snapshot {
            weekly_plans: vec![plan("a", (2025, 3, 3)), plan("b", (2025, 3, 10))],
            ..Snapshot::default()
        };

        assert_eq!(select_plan(&snapshot, None).unwrap().id, "b");
        assert_eq!(select_plan(&snapshot, Some("a")).unwrap().id, "a");
        assert_eq!(select_plan(&snapshot, Some("Week a")).unwrap().id, "a");
        assert!(select_plan(&snapshot, Some("c")).is_err());
        assert!(select_plan(&Snapshot::default(), None).is_err());
    }

    #[test]
    fn test_plain_output_has_no_escapes() {
        let out = Output::default();
        assert_eq!(out.heading("Prep"), "Prep");
        assert_eq!(out.warning("careful"), "careful");
    }
}
