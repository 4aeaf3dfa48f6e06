// src/commands/check.rs

//! Check command - dry run of a recipe's template patches

use super::{build_context, kitchen_config};
use anyhow::{bail, Context, Result};
use m3cook::recipe::PatchReport;
use m3cook::Kitchen;
use serde_json::json;

/// Report per-rule matches of a recipe's edit phase
pub fn cmd_check(
    recipe_name: &str,
    source: &str,
    prefix: &str,
    deps: &[(String, String)],
    tools: &[(String, String)],
    recipe_dir: Option<&str>,
    json: bool,
) -> Result<()> {
    let kitchen = Kitchen::new(kitchen_config(recipe_dir, tools));
    let recipe = kitchen
        .load_recipe(recipe_name)
        .with_context(|| format!("Failed to load recipe: {}", recipe_name))?;
    let ctx = build_context(source, prefix, deps);

    let (reports, warnings) = kitchen
        .check(&recipe, &ctx)
        .with_context(|| format!("Failed to check {}", recipe.package.name))?;

    let missing_required = reports
        .iter()
        .flat_map(|r| r.unmatched())
        .filter(|o| o.required)
        .count();

    if json {
        println!("{}", serde_json::to_string_pretty(&json_report(&reports, &warnings))?);
    } else {
        for report in &reports {
            println!("{}", report.file.display());
            for outcome in &report.rules {
                let status = match (outcome.lines_matched, outcome.required) {
                    (0, true) => "MISSING".to_string(),
                    (0, false) => "unmatched".to_string(),
                    (n, _) => format!("{} line(s)", n),
                };
                println!("  [{}] {}", status, outcome.pattern);
            }
        }
        for warning in &warnings {
            println!("Warning: {}", warning);
        }
    }

    if missing_required > 0 {
        bail!("{} required rule(s) would not match", missing_required);
    }
    Ok(())
}

/// JSON form of a check: per-file rule reports plus cook warnings
fn json_report(reports: &[PatchReport], warnings: &[String]) -> serde_json::Value {
    json!({
        "reports": reports,
        "warnings": warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use m3cook::recipe::RuleOutcome;
    use std::path::PathBuf;

    #[test]
    fn test_json_report_carries_warnings() {
        let reports = vec![PatchReport {
            file: PathBuf::from("/stage/Makefile"),
            rules: vec![RuleOutcome {
                pattern: "^#BININST".to_string(),
                required: false,
                lines_matched: 0,
            }],
            changed: false,
        }];
        let warnings =
            vec!["Anchor '#include \"parms3.h\"' not found in ioapi/sortic.c".to_string()];

        let value = json_report(&reports, &warnings);
        assert_eq!(value["reports"][0]["file"], "/stage/Makefile");
        assert_eq!(value["reports"][0]["rules"][0]["lines_matched"], 0);
        assert_eq!(value["warnings"][0], warnings[0].as_str());
    }
}
