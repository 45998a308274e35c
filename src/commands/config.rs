// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - shows the effective configuration

use super::Output;
use crate::config::{default_config_file, Config};
use anyhow::Result;

/// What to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file and snapshot locations
    Path,
}

/// Run the config command
pub fn run(config: &Config, out: &Output, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show if out.json => out.print_json(config),
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigAction::Path => {
            let config_file = default_config_file()
                .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
            println!("config:   {config_file}");
            println!("snapshot: {}", config.snapshot_path().display());
            Ok(())
        }
    }
}
