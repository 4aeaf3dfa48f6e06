// src/cli.rs
//! CLI definitions for m3cook
//!
//! The command implementations live in the `commands` module.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "m3cook")]
#[command(author = "m3cook contributors")]
#[command(version)]
#[command(about = "Build recipes for the Models-3 I/O API and SMOKE", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Which recipe phases to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PhaseArg {
    /// Edit then install
    All,
    /// Patch templates and generate build files
    Edit,
    /// Build and install
    Install,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List built-in recipes
    List,

    /// Show the steps of a recipe
    Show {
        /// Built-in recipe name or path to a recipe file
        recipe: String,

        /// Directory searched for user recipes
        #[arg(long)]
        recipe_dir: Option<String>,
    },

    /// Cook a recipe against a staged source tree
    Cook {
        /// Built-in recipe name or path to a recipe file
        recipe: String,

        /// Staged source directory
        #[arg(short, long)]
        source: String,

        /// Install prefix
        #[arg(short, long)]
        prefix: String,

        /// Dependency install prefix (NAME=PATH), repeatable
        #[arg(short, long = "dep", value_parser = parse_key_value)]
        deps: Vec<(String, String)>,

        /// Phases to run
        #[arg(long, value_enum, default_value = "all")]
        phase: PhaseArg,

        /// Fail when any patch rule matches nothing
        #[arg(long)]
        strict: bool,

        /// Native build tool
        #[arg(long, default_value = "make")]
        make: String,

        /// Parallel build jobs
        #[arg(short, long)]
        jobs: Option<u32>,

        /// Replacement for a query program (NAME=PATH), repeatable
        #[arg(long = "tool", value_parser = parse_key_value)]
        tools: Vec<(String, String)>,

        /// Directory searched for user recipes
        #[arg(long)]
        recipe_dir: Option<String>,

        /// Print the build log when done
        #[arg(long)]
        show_log: bool,
    },

    /// Report which patch rules would match, without changing anything
    Check {
        /// Built-in recipe name or path to a recipe file
        recipe: String,

        /// Staged source directory
        #[arg(short, long)]
        source: String,

        /// Install prefix
        #[arg(short, long)]
        prefix: String,

        /// Dependency install prefix (NAME=PATH), repeatable
        #[arg(short, long = "dep", value_parser = parse_key_value)]
        deps: Vec<(String, String)>,

        /// Replacement for a query program (NAME=PATH), repeatable
        #[arg(long = "tool", value_parser = parse_key_value)]
        tools: Vec<(String, String)>,

        /// Directory searched for user recipes
        #[arg(long)]
        recipe_dir: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply a rule file to a single file
    Patch {
        /// File to rewrite in place
        file: String,

        /// TOML file of [[rule]] tables
        #[arg(short, long)]
        rules: String,

        /// Fail when any rule matches nothing
        #[arg(long)]
        strict: bool,

        /// Print the result instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse `NAME=VALUE`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}
