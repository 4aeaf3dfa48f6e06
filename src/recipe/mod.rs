// src/recipe/mod.rs

//! Build recipes for Makefile-based packages
//!
//! A recipe is a declarative description of how to turn a staged source
//! tree into an installed package:
//! - **edit** steps patch vendor Makefile templates, inject missing
//!   includes and generate subdirectory build files
//! - **install** steps run the native build targets and copy headers and
//!   build profiles into the install prefix
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "ioapi"
//! version = "3.2"
//! bin = "Linux2_x86_64ifx"
//!
//! [[edit]]
//! action = "filter"
//! file = "Makefile"
//! rules = [
//!     { pattern = '^#\s*(BIN\s*=\s*Linux2_x86_64)', replacement = 'BIN     = %(bin)s', literal = true, required = true },
//! ]
//!
//! [[install]]
//! action = "make"
//! target = "install"
//! ```
//!
//! Fetching, unpacking and ordering packages by dependency are left to the
//! caller.

pub mod builtin;
pub mod filter;
mod format;
pub mod inject;
mod kitchen;
pub mod parser;

pub use builtin::{builtin_recipe, BUILTIN_RECIPES};
pub use filter::{apply_rules, PatchReport, PatchRule, RuleOutcome, TemplateFilter};
pub use format::{substitute, PackageSection, QuerySpec, Recipe, Step};
pub use inject::{inject_after, inject_line};
pub use kitchen::{
    BuildContext, Cook, CookResult, HostToolchain, Kitchen, KitchenConfig, MakeOutput, Phase,
    Prefix, Toolchain,
};
pub use parser::{parse_recipe, parse_recipe_file, parse_rules, validate_recipe};
