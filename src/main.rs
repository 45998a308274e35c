// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Mealgraph CLI - shopping, prep, storage and pull lists for a planned week

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use mealgraph::commands::{self, config::ConfigAction, flow::FlowFormat, Output};
use mealgraph::config::{self, Environment};
use mealgraph::types::Day;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mealgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "MEALGRAPH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Data directory override
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Environment (selects the snapshot under the data directory)
    #[arg(long = "env", value_enum, global = true)]
    environment: Option<Environment>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shopping list grouped by store and section
    Shopping {
        /// Weekly plan id or name (latest when omitted)
        #[arg(short, long)]
        plan: Option<String>,
    },

    /// Merged batch-prep list
    Prep {
        /// Weekly plan id or name (latest when omitted)
        #[arg(short, long)]
        plan: Option<String>,
    },

    /// Containers filled by batch prep, per recipe and per location
    Storage {
        /// Weekly plan id or name (latest when omitted)
        #[arg(short, long)]
        plan: Option<String>,
    },

    /// What to pull before each just-in-time meal
    Pull {
        /// Weekly plan id or name (latest when omitted)
        #[arg(short, long)]
        plan: Option<String>,

        /// Only this day
        #[arg(short, long, value_enum)]
        day: Option<Day>,
    },

    /// Ready-to-eat inventory by meal slot
    Ready,

    /// Export the condensed flow graph
    Flow {
        /// Weekly plan id or name (latest when omitted)
        #[arg(short, long)]
        plan: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "dot")]
        format: FlowFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what replacing a node would drop from a recipe
    Preview {
        /// Recipe id
        recipe: String,

        /// Product node id to replace
        node: String,
    },

    /// Check every recipe graph and override in the snapshot
    Validate,

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?
        .with_overrides(cli.data_dir.clone(), cli.environment);

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => config.level()?,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let out = Output {
        json: cli.json,
        color: !cli.no_color,
    };

    // Execute command
    match cli.command {
        Commands::Shopping { plan } => commands::shopping::run(&config, &out, plan.as_deref()),
        Commands::Prep { plan } => commands::prep::run(&config, &out, plan.as_deref()),
        Commands::Storage { plan } => commands::storage::run(&config, &out, plan.as_deref()),
        Commands::Pull { plan, day } => commands::pull::run(&config, &out, plan.as_deref(), day),
        Commands::Ready => commands::ready::run(&config, &out),
        Commands::Flow {
            plan,
            format,
            output,
        } => commands::flow::run(&config, &out, plan.as_deref(), format, output),
        Commands::Preview { recipe, node } => {
            commands::preview::run(&config, &out, &recipe, &node)
        }
        Commands::Validate => commands::validate::run(&config, &out),
        Commands::Config { action } => commands::config::run(&config, &out, action),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
