// src/recipe/kitchen/config.rs

//! Kitchen configuration and cook results

use crate::recipe::filter::PatchReport;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Native build tool invoked for `make` steps
    pub make_program: String,
    /// Parallel jobs passed through MAKEFLAGS (None = let make decide)
    pub jobs: Option<u32>,
    /// Treat every patch rule as required
    pub strict: bool,
    /// Replacement programs for recipe queries, keyed by the program name
    /// the recipe declares (e.g. `nc-config` -> `/opt/netcdf/bin/nc-config`)
    pub program_overrides: BTreeMap<String, String>,
    /// Directory searched for `<name>.toml` user recipes
    pub recipe_dir: Option<PathBuf>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            make_program: "make".to_string(),
            jobs: None,
            strict: false,
            program_overrides: BTreeMap::new(),
            recipe_dir: dirs::config_dir().map(|d| d.join("m3cook").join("recipes")),
        }
    }
}

/// Result of cooking a recipe
#[derive(Debug, Default)]
pub struct CookResult {
    /// Package that was cooked
    pub package: String,
    /// Build log
    pub log: String,
    /// Warnings generated during the build (unmatched optional rules etc.)
    pub warnings: Vec<String>,
    /// One report per filter step executed
    pub reports: Vec<PatchReport>,
    /// Native build targets that ran, in order
    pub targets: Vec<String>,
    /// Files copied into the prefix by install steps
    pub installed: Vec<PathBuf>,
}
