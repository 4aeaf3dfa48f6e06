// src/recipe/kitchen/context.rs

//! Paths a recipe is cooked against

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Root under which a package is installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix(PathBuf);

impl Prefix {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Named subdirectory of the prefix
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.0.join(name)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Staged source tree, install prefix and dependency prefixes for one cook
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub source_dir: PathBuf,
    pub prefix: Prefix,
    pub deps: BTreeMap<String, Prefix>,
}

impl BuildContext {
    pub fn new(source_dir: impl Into<PathBuf>, prefix: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            prefix: Prefix::new(prefix),
            deps: BTreeMap::new(),
        }
    }

    /// Add the install prefix of an upstream package
    pub fn with_dependency(mut self, name: impl Into<String>, prefix: impl Into<PathBuf>) -> Self {
        self.deps.insert(name.into(), Prefix::new(prefix));
        self
    }

    pub fn dependency(&self, name: &str) -> Result<&Prefix> {
        self.deps
            .get(name)
            .ok_or_else(|| Error::MissingDependency(name.to_string()))
    }

    /// Resolve a path relative to the source tree
    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.source_dir.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_join() {
        let prefix = Prefix::new("/opt/ioapi");
        assert_eq!(
            prefix.join("ioapi").join("fixed_src"),
            PathBuf::from("/opt/ioapi/ioapi/fixed_src")
        );
        assert_eq!(prefix.to_string(), "/opt/ioapi");
    }

    #[test]
    fn test_missing_dependency() {
        let ctx = BuildContext::new("/stage/smoke", "/opt/smoke");
        assert!(matches!(ctx.dependency("ioapi"), Err(Error::MissingDependency(_))));

        let ctx = ctx.with_dependency("ioapi", "/opt/ioapi");
        assert_eq!(ctx.dependency("ioapi").unwrap().path(), Path::new("/opt/ioapi"));
    }
}
