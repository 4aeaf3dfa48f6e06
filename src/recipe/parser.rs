// src/recipe/parser.rs

//! Recipe and rule file parsing

use crate::error::{Error, Result};
use crate::recipe::filter::PatchRule;
use crate::recipe::format::{Recipe, Step};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

#[derive(Deserialize)]
struct RuleFile {
    #[serde(default)]
    rule: Vec<PatchRule>,
}

/// Parse a standalone rule file made of `[[rule]]` tables
pub fn parse_rules(content: &str) -> Result<Vec<PatchRule>> {
    let file: RuleFile = toml::from_str(content)
        .map_err(|e| Error::ParseError(format!("Invalid rule file: {}", e)))?;
    Ok(file.rule)
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors are returned as `Err`; softer issues come back as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ParseError("Recipe package name cannot be empty".to_string()));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ParseError("Recipe package version cannot be empty".to_string()));
    }
    if recipe.package.bin.is_empty() {
        return Err(Error::ParseError("Recipe bin tag cannot be empty".to_string()));
    }

    for step in recipe.edit.iter().chain(recipe.install.iter()) {
        check_step(recipe, step, &mut warnings)?;
    }

    if recipe.package.summary.is_none() {
        warnings.push("Missing package summary".to_string());
    }
    if recipe.edit.is_empty() {
        warnings.push("No edit steps specified".to_string());
    }
    if !recipe.install.iter().any(|s| matches!(s, Step::Make { .. })) {
        warnings.push("No make target in install phase".to_string());
    }

    Ok(warnings)
}

fn check_step(recipe: &Recipe, step: &Step, warnings: &mut Vec<String>) -> Result<()> {
    for reference in step.references() {
        if let Some(dep) = reference.strip_prefix("dep.") {
            if !recipe.package.depends.iter().any(|d| d == dep) {
                return Err(Error::ParseError(format!(
                    "{} refers to undeclared dependency '{}'",
                    step.describe(),
                    dep
                )));
            }
        } else if let Some(query) = reference.strip_prefix("query.") {
            if !recipe.queries.contains_key(query) {
                return Err(Error::ParseError(format!(
                    "{} refers to undeclared query '{}'",
                    step.describe(),
                    query
                )));
            }
        }
    }

    if let Step::Filter { file, rules } = step {
        if rules.is_empty() {
            warnings.push(format!("Filter on {} has no rules", file));
        }
        for rule in rules {
            // Patterns with variables are checked once resolved
            for pattern in std::iter::once(&rule.pattern).chain(rule.unless.iter()) {
                if pattern.contains("%(") {
                    continue;
                }
                Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[package]
name = "test"
version = "1.0"
bin = "Linux2_x86_64gfort"

[[edit]]
action = "filter"
file = "Makefile"
rules = [
    { pattern = '^#\s*(BIN\s*=.*)', replacement = '${1}' },
]

[[install]]
action = "make"
target = "install"
"#;

    #[test]
    fn test_parse_valid_recipe() {
        let recipe = parse_recipe(MINIMAL).unwrap();
        assert_eq!(recipe.package.name, "test");
        assert_eq!(recipe.edit.len(), 1);
        assert_eq!(recipe.rule_count(), 1);
        assert!(matches!(&recipe.install[0], Step::Make { target } if target == "install"));
    }

    #[test]
    fn test_parse_invalid_recipe() {
        assert!(parse_recipe("this is not valid toml at all {}").is_err());
    }

    #[test]
    fn test_parse_unknown_action() {
        let content = r#"
[package]
name = "x"
version = "1"
bin = "b"

[[edit]]
action = "download"
url = "https://example.com"
"#;
        assert!(matches!(parse_recipe(content), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_validate_warnings() {
        let recipe = parse_recipe(MINIMAL).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("summary")));
        assert!(!warnings.iter().any(|w| w.contains("make target")));
    }

    #[test]
    fn test_validate_empty_bin() {
        let recipe = parse_recipe(&MINIMAL.replace("Linux2_x86_64gfort", "")).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_bad_pattern() {
        let recipe = parse_recipe(&MINIMAL.replace(r"^#\s*(BIN\s*=.*)", "(BIN")).unwrap();
        assert!(matches!(
            validate_recipe(&recipe),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_validate_undeclared_dependency() {
        let content = MINIMAL.replace(
            "replacement = '${1}'",
            "replacement = 'IOBASE = %(dep.ioapi)s'",
        );
        let recipe = parse_recipe(&content).unwrap();
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(err.to_string().contains("ioapi"));
    }

    #[test]
    fn test_parse_rules() {
        let rules = parse_rules(
            r#"
[[rule]]
pattern = 'icc'
replacement = 'icx'

[[rule]]
pattern = '^\s*FC\s*=.*'
replacement = 'FC = ifx'
literal = true
required = true
"#,
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert!(!rules[0].required);
        assert!(rules[1].literal && rules[1].required);
    }
}
