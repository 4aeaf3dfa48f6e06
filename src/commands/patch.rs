// src/commands/patch.rs

//! Patch command - apply an ad-hoc rule file to one file

use anyhow::{Context, Result};
use m3cook::recipe::parse_rules;
use m3cook::TemplateFilter;
use std::io::Write;
use std::path::Path;

/// Apply the rules in `rules_path` to `file`
pub fn cmd_patch(file: &str, rules_path: &str, strict: bool, dry_run: bool) -> Result<()> {
    let content = std::fs::read_to_string(rules_path)
        .with_context(|| format!("Failed to read rule file: {}", rules_path))?;
    let rules = parse_rules(&content)?;
    let filter = TemplateFilter::new(Path::new(file)).strict(strict);

    let report = if dry_run {
        let (patched, report) = filter.preview(&rules)?;
        std::io::stdout().write_all(&patched)?;
        report
    } else {
        filter
            .filter(&rules)
            .with_context(|| format!("Failed to patch {}", filter.path().display()))?
    };

    for outcome in &report.rules {
        eprintln!("{:>4}  {}", outcome.lines_matched, outcome.pattern);
    }
    if !report.changed {
        eprintln!("{}: no changes", filter.path().display());
    }
    Ok(())
}
