// src/commands/cook.rs

//! Cook command - run recipe phases against a staged source tree

use super::{build_context, kitchen_config};
use crate::cli::PhaseArg;
use anyhow::{Context, Result};
use m3cook::recipe::validate_recipe;
use m3cook::{Kitchen, Phase};
use tracing::info;

/// Options for `m3cook cook`
pub struct CookOptions {
    pub recipe: String,
    pub source: String,
    pub prefix: String,
    pub deps: Vec<(String, String)>,
    pub phase: PhaseArg,
    pub strict: bool,
    pub make: String,
    pub jobs: Option<u32>,
    pub tools: Vec<(String, String)>,
    pub recipe_dir: Option<String>,
    pub show_log: bool,
}

/// Cook a recipe
pub fn cmd_cook(opts: CookOptions) -> Result<()> {
    let mut config = kitchen_config(opts.recipe_dir.as_deref(), &opts.tools);
    config.make_program = opts.make;
    config.jobs = opts.jobs;
    config.strict = opts.strict;

    let kitchen = Kitchen::new(config);
    let recipe = kitchen
        .load_recipe(&opts.recipe)
        .with_context(|| format!("Failed to load recipe: {}", opts.recipe))?;

    println!(
        "Recipe: {} version {} ({})",
        recipe.package.name, recipe.package.version, recipe.package.bin
    );

    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    if kitchen.config().strict {
        println!("Strict mode: every patch rule must match");
    }

    let ctx = build_context(&opts.source, &opts.prefix, &opts.deps);
    let phases: &[Phase] = match opts.phase {
        PhaseArg::All => &Phase::ALL,
        PhaseArg::Edit => &[Phase::Edit],
        PhaseArg::Install => &[Phase::Install],
    };

    let result = kitchen
        .run(&recipe, &ctx, phases)
        .with_context(|| format!("Failed to cook {}", recipe.package.name))?;

    if opts.show_log {
        print!("{}", result.log);
    }

    println!("\n[COMPLETE] Cooked: {}", recipe.package.name);
    if !result.targets.is_empty() {
        println!("  Targets: {}", result.targets.join(", "));
    }
    if !result.installed.is_empty() {
        println!("  Installed {} file(s) under {}", result.installed.len(), opts.prefix);
    }

    if !result.warnings.is_empty() {
        println!("\nBuild warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    info!("Successfully cooked {} into {}", recipe.package.name, opts.prefix);
    Ok(())
}
