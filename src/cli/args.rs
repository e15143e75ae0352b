//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::TraversalOrder;

/// Traverse MEP systems into hierarchical XML and JSON exports
#[derive(Parser, Debug)]
#[command(name = "mepgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every desirable system of a model
    Export {
        /// Model JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        model: PathBuf,

        /// Output directory (default: new directory under the temp dir)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,

        /// Order of stored hierarchy text
        #[arg(long)]
        order: Option<TraversalOrder>,

        /// Store each system's hierarchy text on the system
        #[arg(long)]
        store_systems: Option<bool>,

        /// Store the project composite on the project record
        #[arg(long)]
        store_project: Option<bool>,

        /// Traverse systems in parallel
        #[arg(long)]
        parallel: bool,

        /// Abort a system's traversal beyond this many nodes
        #[arg(long)]
        max_nodes: Option<usize>,
    },

    /// Show the traversal tree of systems
    Tree {
        /// Model JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        model: PathBuf,

        /// Only this system id (default: all desirable systems)
        #[arg(short, long)]
        system: Option<i64>,
    },

    /// List systems with category and desirability
    Systems {
        /// Model JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        model: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Include local config next to this model
        #[arg(value_hint = ValueHint::FilePath)]
        model: Option<PathBuf>,
    },

    /// Create global config template
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
