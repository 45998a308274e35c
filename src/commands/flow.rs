// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Flow command - exports the condensed week flow graph

use super::{load_week, Output};
use crate::aggregate::build_flow_graph;
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FlowFormat {
    /// Graphviz DOT format
    Dot,
    /// JSON format
    Json,
}

impl FlowFormat {
    /// Get file extension for format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Json => "json",
        }
    }
}

/// Run the flow command
pub fn run(
    config: &Config,
    out: &Output,
    plan: Option<&str>,
    format: FlowFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = if out.json { FlowFormat::Json } else { format };
    info!("Exporting flow graph as {}", format.extension());

    let (plan, week) = load_week(config, plan, out)?;
    let flow = build_flow_graph(&week.meals)
        .with_context(|| format!("Failed to build flow graph for {}", plan.name))?;

    if flow.nodes.is_empty() {
        eprintln!("{}", out.warning("Warning: flow graph is empty"));
    }

    let content = match format {
        FlowFormat::Dot => flow.to_dot(),
        FlowFormat::Json => flow.to_json().context("Failed to serialize flow graph")?,
    };

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}
