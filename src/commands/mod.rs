// src/commands/mod.rs
//! Command handlers for the m3cook CLI

mod check;
mod cook;
mod patch;
mod recipes;

pub use check::cmd_check;
pub use cook::{cmd_cook, CookOptions};
pub use patch::cmd_patch;
pub use recipes::{cmd_list, cmd_show};

use m3cook::{BuildContext, KitchenConfig};
use std::path::PathBuf;

/// Kitchen configuration shared by commands that load recipes
fn kitchen_config(recipe_dir: Option<&str>, tools: &[(String, String)]) -> KitchenConfig {
    let mut config = KitchenConfig::default();
    if let Some(dir) = recipe_dir {
        config.recipe_dir = Some(PathBuf::from(dir));
    }
    config.program_overrides.extend(tools.iter().cloned());
    config
}

fn build_context(source: &str, prefix: &str, deps: &[(String, String)]) -> BuildContext {
    deps.iter().fold(BuildContext::new(source, prefix), |ctx, (name, path)| {
        ctx.with_dependency(name.clone(), path)
    })
}
