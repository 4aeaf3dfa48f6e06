// src/lib.rs

//! m3cook: build recipes for the Models-3 I/O API and SMOKE
//!
//! Drives Makefile-based scientific packages from a staged source tree to
//! an install prefix: vendor templates are patched with ordered regex
//! rules, missing includes are injected, and the native build targets are
//! run.
//!
//! # Architecture
//!
//! - Declarative TOML recipes (`edit` and `install` step lists)
//! - Pure rule application (`recipe::apply_rules`) under a thin file layer
//! - A `Toolchain` trait between the cook and the processes it spawns

mod error;
pub mod recipe;

pub use error::{Error, Result};
pub use recipe::{
    BuildContext, CookResult, Kitchen, KitchenConfig, PatchRule, Phase, Prefix, Recipe,
    TemplateFilter, Toolchain,
};
