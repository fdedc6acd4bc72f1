//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Content-tree mutation and order reconciliation for page and menu aggregates
#[derive(Parser, Debug)]
#[command(name = "cmstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding a local .cmstree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a snapshot as a tree
    Show {
        /// Snapshot JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: PathBuf,
    },

    /// Apply one operation to a snapshot
    Apply {
        /// Snapshot JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: PathBuf,
        /// Operation descriptor JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        operation: PathBuf,
        /// Rewrite the snapshot file instead of printing the new snapshot
        #[arg(short, long)]
        in_place: bool,
    },

    /// Shallow diff of two JSON objects
    Diff {
        /// Base JSON object
        #[arg(value_hint = ValueHint::FilePath)]
        base: PathBuf,
        /// Changed JSON object
        #[arg(value_hint = ValueHint::FilePath)]
        change: PathBuf,
    },

    /// Print the cleaned order skeleton of a raw payload
    #[command(name = "clean-order")]
    CleanOrder {
        /// Raw order payload JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        payload: PathBuf,
    },

    /// Show width and spacing classes of a node
    Classes {
        /// Snapshot JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: PathBuf,
        /// Node uuid
        uuid: String,
    },

    /// Check snapshot invariants
    Validate {
        /// Snapshot JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: PathBuf,
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
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
