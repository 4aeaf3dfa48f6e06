// src/commands/recipes.rs

//! Recipe listing and inspection

use super::kitchen_config;
use anyhow::{Context, Result};
use m3cook::recipe::{builtin_recipe, Step, BUILTIN_RECIPES};
use m3cook::Kitchen;

/// List built-in recipes
pub fn cmd_list() -> Result<()> {
    for name in BUILTIN_RECIPES {
        let recipe = builtin_recipe(name)?;
        println!(
            "{:<8} {:<6} {}",
            recipe.package.name,
            recipe.package.version,
            recipe.package.summary.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Print a recipe's metadata and steps
pub fn cmd_show(name: &str, recipe_dir: Option<&str>) -> Result<()> {
    let kitchen = Kitchen::new(kitchen_config(recipe_dir, &[]));
    let recipe = kitchen
        .load_recipe(name)
        .with_context(|| format!("Failed to load recipe: {}", name))?;

    println!("{} {}", recipe.package.name, recipe.package.version);
    println!("  bin: {}", recipe.package.bin);
    if !recipe.package.depends.is_empty() {
        println!("  depends: {}", recipe.package.depends.join(", "));
    }
    for (name, query) in &recipe.queries {
        println!("  query {}: {}", name, query);
    }
    println!(
        "  {} patch rule(s) in {} filter step(s)",
        recipe.rule_count(),
        recipe.filter_steps().count()
    );

    for (phase, steps) in [("edit", &recipe.edit), ("install", &recipe.install)] {
        println!("\n{}:", phase);
        for step in steps {
            println!("  {}", step.describe());
            if let Step::Filter { rules, .. } = step {
                for rule in rules {
                    let flag = if rule.required { "!" } else { " " };
                    println!("    {} {}", flag, rule.pattern);
                }
            }
        }
    }
    Ok(())
}
