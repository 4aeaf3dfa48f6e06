// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files with an ordered list of `edit` steps (template
//! patching, run before the build) and `install` steps (native build targets
//! and artifact placement).

use crate::error::{Error, Result};
use crate::recipe::filter::PatchRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A complete build recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Variables for substitution (optional)
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    /// External programs queried before editing; their trimmed stdout is
    /// available as `%(query.<name>)s`
    #[serde(default)]
    pub queries: BTreeMap<String, QuerySpec>,

    /// Steps of the edit phase, in order
    #[serde(default)]
    pub edit: Vec<Step>,

    /// Steps of the install phase, in order
    #[serde(default)]
    pub install: Vec<Step>,
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Platform and compiler tag selecting the vendor build profile
    pub bin: String,

    /// Short description
    #[serde(default)]
    pub summary: Option<String>,

    /// Upstream homepage
    #[serde(default)]
    pub homepage: Option<String>,

    /// Packages whose install prefix this recipe reads
    #[serde(default)]
    pub depends: Vec<String>,
}

/// An external configuration program to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// One action of a phase
///
/// Source-side paths (`file`, `from`, `to`, `target`, `link`, `pattern`) are
/// relative to the staged source directory; `path` and `dest` are relative
/// to the install prefix. Absolute paths are used as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Create `link` pointing at `target`, unless `link` already exists
    Symlink { target: String, link: String },

    /// Copy one file inside the source tree
    Copy { from: String, to: String },

    /// Apply patch rules to a template file
    Filter { file: String, rules: Vec<PatchRule> },

    /// Insert `line` after the first line starting with `anchor`
    Inject {
        file: String,
        anchor: String,
        line: String,
        #[serde(default)]
        required: bool,
    },

    /// Run a native build target in the source directory
    Make { target: String },

    /// Create a directory under the prefix
    Mkdir { path: String },

    /// Copy files matching a glob into a prefix directory
    Install { pattern: String, dest: String },
}

impl Step {
    /// Short human-readable description for logs
    pub fn describe(&self) -> String {
        match self {
            Step::Symlink { target, link } => format!("symlink {} -> {}", link, target),
            Step::Copy { from, to } => format!("copy {} -> {}", from, to),
            Step::Filter { file, rules } => format!("filter {} ({} rules)", file, rules.len()),
            Step::Inject { file, line, .. } => format!("inject '{}' into {}", line, file),
            Step::Make { target } => format!("make {}", target),
            Step::Mkdir { path } => format!("mkdir {}", path),
            Step::Install { pattern, dest } => format!("install {} -> {}", pattern, dest),
        }
    }

    /// Return a copy with every `%(name)s` reference resolved
    pub fn substitute(&self, vars: &BTreeMap<String, String>) -> Result<Step> {
        let sub = |s: &str| substitute(s, vars);
        Ok(match self {
            Step::Symlink { target, link } => Step::Symlink {
                target: sub(target)?,
                link: sub(link)?,
            },
            Step::Copy { from, to } => Step::Copy {
                from: sub(from)?,
                to: sub(to)?,
            },
            Step::Filter { file, rules } => Step::Filter {
                file: sub(file)?,
                rules: rules
                    .iter()
                    .map(|r| -> Result<PatchRule> {
                        Ok(PatchRule {
                            pattern: sub(&r.pattern)?,
                            replacement: sub(&r.replacement)?,
                            unless: r.unless.as_deref().map(sub).transpose()?,
                            ..r.clone()
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            },
            Step::Inject {
                file,
                anchor,
                line,
                required,
            } => Step::Inject {
                file: sub(file)?,
                anchor: sub(anchor)?,
                line: sub(line)?,
                required: *required,
            },
            Step::Make { target } => Step::Make {
                target: sub(target)?,
            },
            Step::Mkdir { path } => Step::Mkdir { path: sub(path)? },
            Step::Install { pattern, dest } => Step::Install {
                pattern: sub(pattern)?,
                dest: sub(dest)?,
            },
        })
    }

    /// Names of the `%(name)s` references anywhere in the step
    pub fn references(&self) -> Vec<String> {
        let mut fields: Vec<&str> = Vec::new();
        match self {
            Step::Symlink { target, link } => fields.extend([target.as_str(), link.as_str()]),
            Step::Copy { from, to } => fields.extend([from.as_str(), to.as_str()]),
            Step::Filter { file, rules } => {
                fields.push(file);
                for rule in rules {
                    fields.push(&rule.pattern);
                    fields.push(&rule.replacement);
                    if let Some(guard) = &rule.unless {
                        fields.push(guard);
                    }
                }
            }
            Step::Inject {
                file, anchor, line, ..
            } => fields.extend([file.as_str(), anchor.as_str(), line.as_str()]),
            Step::Make { target } => fields.push(target),
            Step::Mkdir { path } => fields.push(path),
            Step::Install { pattern, dest } => fields.extend([pattern.as_str(), dest.as_str()]),
        }

        let mut names = Vec::new();
        for field in fields {
            let mut rest = field;
            while let Some(start) = rest.find("%(") {
                let after = &rest[start + 2..];
                let Some(end) = after.find(")s") else {
                    break;
                };
                names.push(after[..end].to_string());
                rest = &after[end + 2..];
            }
        }
        names
    }
}

impl Recipe {
    /// Variables every recipe gets without declaring them
    ///
    /// Context-dependent values (`source`, `prefix`, `dep.*`, `query.*`) are
    /// added by the kitchen.
    pub fn builtin_variables(&self) -> BTreeMap<String, String> {
        let mut vars = self.variables.clone();
        vars.insert("name".to_string(), self.package.name.clone());
        vars.insert("version".to_string(), self.package.version.clone());
        vars.insert("bin".to_string(), self.package.bin.clone());
        vars
    }

    /// All filter steps of the edit phase
    pub fn filter_steps(&self) -> impl Iterator<Item = &Step> {
        self.edit
            .iter()
            .filter(|s| matches!(s, Step::Filter { .. }))
    }

    /// Number of patch rules across all edit steps
    pub fn rule_count(&self) -> usize {
        self.filter_steps()
            .map(|s| match s {
                Step::Filter { rules, .. } => rules.len(),
                _ => 0,
            })
            .sum()
    }
}

/// Replace `%(name)s` references with values from `vars`
///
/// An unterminated `%(` is kept as text; a terminated reference to an
/// unknown name is an error.
pub fn substitute(template: &str, vars: &BTreeMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("%(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find(")s") {
            Some(end) => {
                let name = &after[..end];
                let value = vars
                    .get(name)
                    .ok_or_else(|| Error::UndefinedVariable(name.to_string()))?;
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    Ok(out)
}
