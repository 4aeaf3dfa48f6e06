// src/recipe/builtin.rs

//! Recipes shipped with m3cook

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::parser::parse_recipe;

const IOAPI: &str = include_str!("../../recipes/ioapi.toml");
const SMOKE: &str = include_str!("../../recipes/smoke.toml");

/// Names of the built-in recipes, in build order
pub const BUILTIN_RECIPES: &[&str] = &["ioapi", "smoke"];

/// Look up a built-in recipe by name
pub fn builtin_recipe(name: &str) -> Result<Recipe> {
    let source = match name {
        "ioapi" => IOAPI,
        "smoke" => SMOKE,
        other => return Err(Error::NotFound(format!("built-in recipe '{}'", other))),
    };
    parse_recipe(source)
}
