// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use commands::CookOptions;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => commands::cmd_list(),
        Some(Commands::Show { recipe, recipe_dir }) => {
            commands::cmd_show(&recipe, recipe_dir.as_deref())
        }
        Some(Commands::Cook {
            recipe,
            source,
            prefix,
            deps,
            phase,
            strict,
            make,
            jobs,
            tools,
            recipe_dir,
            show_log,
        }) => commands::cmd_cook(CookOptions {
            recipe,
            source,
            prefix,
            deps,
            phase,
            strict,
            make,
            jobs,
            tools,
            recipe_dir,
            show_log,
        }),
        Some(Commands::Check {
            recipe,
            source,
            prefix,
            deps,
            tools,
            recipe_dir,
            json,
        }) => commands::cmd_check(
            &recipe,
            &source,
            &prefix,
            &deps,
            &tools,
            recipe_dir.as_deref(),
            json,
        ),
        Some(Commands::Patch {
            file,
            rules,
            strict,
            dry_run,
        }) => commands::cmd_patch(&file, &rules, strict, dry_run),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "m3cook", &mut std::io::stdout());
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
