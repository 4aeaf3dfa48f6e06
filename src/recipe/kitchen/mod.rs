// src/recipe/kitchen/mod.rs

//! Kitchen: drives recipes through their phases
//!
//! A cook runs against a staged source tree the caller has already fetched
//! and unpacked. It:
//! - Resolves dependency prefixes and configuration queries
//! - Patches vendor templates (edit phase)
//! - Runs native build targets and places artifacts (install phase)
//!
//! Phases run once each, in order, and the first failure aborts the cook.
//! Cross-package ordering is the caller's job.

mod config;
mod context;
mod cook;
pub mod toolchain;

pub use config::{CookResult, KitchenConfig};
pub use context::{BuildContext, Prefix};
pub use cook::Cook;
pub use toolchain::{HostToolchain, MakeOutput, Toolchain};

use crate::error::{Error, Result};
use crate::recipe::builtin::builtin_recipe;
use crate::recipe::filter::PatchReport;
use crate::recipe::format::Recipe;
use crate::recipe::parser::parse_recipe_file;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A recipe phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Template patching and build-file generation
    Edit,
    /// Native build and artifact placement
    Install,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Edit, Phase::Install];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Edit => write!(f, "edit"),
            Phase::Install => write!(f, "install"),
        }
    }
}

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    toolchain: Arc<dyn Toolchain>,
}

impl Kitchen {
    /// Create a Kitchen running tools on the host
    pub fn new(config: KitchenConfig) -> Self {
        let toolchain = Arc::new(HostToolchain::new(&config));
        Self { config, toolchain }
    }

    /// Create a Kitchen with a custom toolchain
    pub fn with_toolchain(config: KitchenConfig, toolchain: Arc<dyn Toolchain>) -> Self {
        Self { config, toolchain }
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Find a recipe by path, built-in name, or name in the recipe directory
    pub fn load_recipe(&self, name: &str) -> Result<Recipe> {
        let as_path = Path::new(name);
        if name.ends_with(".toml") || as_path.is_file() {
            return parse_recipe_file(as_path);
        }

        if let Some(dir) = &self.config.recipe_dir {
            let candidate = dir.join(format!("{}.toml", name));
            if candidate.is_file() {
                info!("Using recipe {}", candidate.display());
                return parse_recipe_file(&candidate);
            }
        }

        builtin_recipe(name)
    }

    /// Run the given phases of a recipe, in the order given
    ///
    /// Dependency prefixes and queries are resolved before any step runs,
    /// so a failing query stops the cook before templates are touched or
    /// the build tool is invoked.
    pub fn run(
        &self,
        recipe: &Recipe,
        ctx: &BuildContext,
        phases: &[Phase],
    ) -> Result<CookResult> {
        if !ctx.source_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "source directory {}",
                ctx.source_dir.display()
            )));
        }

        let mut cook = Cook::new(self, recipe, ctx)?;
        cook.run_queries(phases)?;
        for phase in phases {
            cook.run_phase(*phase)?;
        }

        let result = cook.finish();
        info!(
            "Cooked {} ({} targets, {} files installed)",
            recipe.package.name,
            result.targets.len(),
            result.installed.len()
        );
        Ok(result)
    }

    /// Run both phases
    pub fn cook(&self, recipe: &Recipe, ctx: &BuildContext) -> Result<CookResult> {
        self.run(recipe, ctx, &Phase::ALL)
    }

    /// Run only the edit phase
    pub fn edit(&self, recipe: &Recipe, ctx: &BuildContext) -> Result<CookResult> {
        self.run(recipe, ctx, &[Phase::Edit])
    }

    /// Run only the install phase
    pub fn install(&self, recipe: &Recipe, ctx: &BuildContext) -> Result<CookResult> {
        self.run(recipe, ctx, &[Phase::Install])
    }

    /// Report how the edit phase's rules would match, without writing
    ///
    /// Queries still run, since rule text may depend on their output.
    pub fn check(
        &self,
        recipe: &Recipe,
        ctx: &BuildContext,
    ) -> Result<(Vec<PatchReport>, Vec<String>)> {
        let mut cook = Cook::new(self, recipe, ctx)?;
        cook.run_queries(&[Phase::Edit])?;
        let reports = cook.preview_edit()?;
        Ok((reports, cook.finish().warnings))
    }
}
