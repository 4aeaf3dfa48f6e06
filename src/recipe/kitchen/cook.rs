// src/recipe/kitchen/cook.rs

//! Cook: phase execution for a single recipe

use crate::error::{Error, Result};
use crate::recipe::filter::{apply_rules, read_existing, PatchReport, TemplateFilter};
use crate::recipe::format::{Recipe, Step};
use crate::recipe::inject::{inject_after, inject_line};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::config::CookResult;
use super::context::BuildContext;
use super::{Kitchen, Phase};

/// A single cook operation
pub struct Cook<'a> {
    pub(super) kitchen: &'a Kitchen,
    pub(super) recipe: &'a Recipe,
    pub(super) ctx: &'a BuildContext,
    /// Values for `%(name)s` references
    pub(super) vars: BTreeMap<String, String>,
    pub(super) result: CookResult,
}

impl<'a> Cook<'a> {
    /// Resolve recipe variables against the context
    ///
    /// Every declared dependency must have a prefix in the context.
    pub(super) fn new(
        kitchen: &'a Kitchen,
        recipe: &'a Recipe,
        ctx: &'a BuildContext,
    ) -> Result<Self> {
        let mut vars = recipe.builtin_variables();
        vars.insert("source".to_string(), ctx.source_dir.to_string_lossy().into_owned());
        vars.insert("prefix".to_string(), ctx.prefix.to_string());

        for dep in &recipe.package.depends {
            let prefix = ctx.dependency(dep)?;
            vars.insert(format!("dep.{}", dep), prefix.to_string());
        }

        Ok(Self {
            kitchen,
            recipe,
            ctx,
            vars,
            result: CookResult {
                package: recipe.package.name.clone(),
                ..Default::default()
            },
        })
    }

    /// Run the configuration queries the selected phases need
    ///
    /// The edit phase runs every declared query; install alone runs only the
    /// ones its steps reference.
    pub(super) fn run_queries(&mut self, phases: &[Phase]) -> Result<()> {
        let recipe = self.recipe;
        let mut needed = BTreeSet::new();
        if phases.contains(&Phase::Edit) {
            needed.extend(recipe.queries.keys().cloned());
        }
        if phases.contains(&Phase::Install) {
            for step in &recipe.install {
                needed.extend(
                    step.references()
                        .into_iter()
                        .filter_map(|r| r.strip_prefix("query.").map(str::to_string)),
                );
            }
        }

        for name in needed {
            let spec = recipe
                .queries
                .get(&name)
                .ok_or_else(|| Error::UndefinedVariable(format!("query.{}", name)))?;
            info!("Querying {}", spec);
            let value = self.kitchen.toolchain.query(spec)?;
            debug!("{} -> {}", spec, value);
            self.log_line(&format!("Query {}: {}", spec, value));
            self.vars.insert(format!("query.{}", name), value);
        }

        Ok(())
    }

    /// Run all steps of one phase in order
    pub(super) fn run_phase(&mut self, phase: Phase) -> Result<()> {
        let recipe = self.recipe;
        let steps = match phase {
            Phase::Edit => &recipe.edit,
            Phase::Install => &recipe.install,
        };

        info!("Running {} phase for {}", phase, recipe.package.name);
        self.log_line(&format!("=== {} ===", phase));

        for step in steps {
            let step = step.substitute(&self.vars)?;
            debug!("{}", step.describe());
            self.run_step(&step)?;
        }

        Ok(())
    }

    fn run_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Symlink { target, link } => self.symlink(target, link),
            Step::Copy { from, to } => {
                let from_path = self.ctx.source_path(from);
                if !from_path.exists() {
                    return Err(Error::NotFound(from_path.display().to_string()));
                }
                fs::copy(&from_path, self.ctx.source_path(to))?;
                self.log_line(&format!("Copied {} to {}", from, to));
                Ok(())
            }
            Step::Filter { file, rules } => {
                let report = TemplateFilter::new(self.ctx.source_path(file))
                    .strict(self.kitchen.config.strict)
                    .filter(rules)?;
                self.record_report(file, report);
                Ok(())
            }
            Step::Inject {
                file,
                anchor,
                line,
                required,
            } => {
                let path = self.ctx.source_path(file);
                let injected = inject_line(&path, anchor, line, *required)?;
                if injected {
                    self.log_line(&format!("Injected '{}' into {}", line, file));
                } else {
                    self.warn(format!("Anchor '{}' not found in {}", anchor, file));
                }
                Ok(())
            }
            Step::Make { target } => {
                info!("make {}", target);
                let output = self.kitchen.toolchain.make(target, &self.ctx.source_dir)?;
                self.log_build_output(target, &output.stdout, &output.stderr);
                self.result.targets.push(target.clone());
                Ok(())
            }
            Step::Mkdir { path } => {
                let dir = self.ctx.prefix.join(path);
                fs::create_dir_all(&dir)?;
                self.log_line(&format!("Created {}", dir.display()));
                Ok(())
            }
            Step::Install { pattern, dest } => self.install_glob(pattern, dest),
        }
    }

    fn symlink(&mut self, target: &str, link: &str) -> Result<()> {
        let link_path = self.ctx.source_path(link);
        if link_path.symlink_metadata().is_ok() {
            debug!("{} already exists, not linking", link_path.display());
            return Ok(());
        }

        #[cfg(unix)]
        std::os::unix::fs::symlink(target, &link_path)?;
        #[cfg(not(unix))]
        fs::copy(self.ctx.source_path(target), &link_path)?;

        self.log_line(&format!("Linked {} -> {}", link, target));
        Ok(())
    }

    /// Copy every file matching `pattern` into `dest` under the prefix
    fn install_glob(&mut self, pattern: &str, dest: &str) -> Result<()> {
        let full_pattern = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            format!(
                "{}/{}",
                glob::Pattern::escape(&self.ctx.source_dir.to_string_lossy()),
                pattern
            )
        };

        let mut files = Vec::new();
        let entries = glob::glob(&full_pattern)
            .map_err(|e| Error::ParseError(format!("Invalid install pattern {}: {}", pattern, e)))?;
        for entry in entries {
            let path = entry.map_err(|e| Error::IoError(e.to_string()))?;
            if path.is_file() {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(Error::NotFound(format!("no files match {}", full_pattern)));
        }

        let dest_dir = self.ctx.prefix.join(dest);
        fs::create_dir_all(&dest_dir)?;

        for file in files {
            let Some(name) = file.file_name() else {
                continue;
            };
            let target = dest_dir.join(name);
            fs::copy(&file, &target)?;
            debug!("installed {}", target.display());
            self.result.installed.push(target);
        }

        self.log_line(&format!("Installed {} -> {}", pattern, dest_dir.display()));
        Ok(())
    }

    /// Evaluate the edit phase's file edits in memory
    ///
    /// Copies, links, filters and injections are replayed against an
    /// overlay so later steps see earlier results; nothing on disk changes
    /// and no build target runs.
    pub(super) fn preview_edit(&mut self) -> Result<Vec<PatchReport>> {
        let mut overlay: HashMap<PathBuf, Vec<u8>> = HashMap::new();
        let mut reports = Vec::new();
        let recipe = self.recipe;

        for step in &recipe.edit {
            let step = step.substitute(&self.vars)?;
            match &step {
                Step::Symlink { target, link } => {
                    let link_path = self.ctx.source_path(link);
                    if link_path.symlink_metadata().is_err() {
                        let base = link_path.parent().unwrap_or(self.ctx.source_dir.as_path());
                        let content = read_overlay(&overlay, &base.join(target))?;
                        overlay.insert(link_path, content);
                    }
                }
                Step::Copy { from, to } => {
                    let content = read_overlay(&overlay, &self.ctx.source_path(from))?;
                    overlay.insert(self.ctx.source_path(to), content);
                }
                Step::Filter { file, rules } => {
                    let path = self.ctx.source_path(file);
                    let original = read_overlay(&overlay, &path)?;
                    let (content, outcomes) = apply_rules(&original, rules)?;
                    reports.push(PatchReport {
                        file: path.clone(),
                        changed: content != original,
                        rules: outcomes,
                    });
                    overlay.insert(path, content);
                }
                Step::Inject { file, anchor, line, .. } => {
                    let path = self.ctx.source_path(file);
                    let original = read_overlay(&overlay, &path)?;
                    let (content, injected) = inject_after(&original, anchor, line);
                    if !injected {
                        self.warn(format!("Anchor '{}' not found in {}", anchor, file));
                    }
                    overlay.insert(path, content);
                }
                Step::Make { .. } | Step::Mkdir { .. } | Step::Install { .. } => {}
            }
        }

        Ok(reports)
    }

    fn record_report(&mut self, file: &str, report: PatchReport) {
        let matched = report.rules.iter().filter(|r| r.matched()).count();
        self.log_line(&format!(
            "Filtered {}: {}/{} rules matched",
            file,
            matched,
            report.rules.len()
        ));
        let unmatched: Vec<String> = report
            .unmatched()
            .map(|r| format!("Rule '{}' matched nothing in {}", r.pattern, file))
            .collect();
        for message in unmatched {
            self.result.warnings.push(message);
        }
        self.result.reports.push(report);
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.result.warnings.push(message);
    }

    pub(super) fn finish(self) -> CookResult {
        self.result
    }

    fn log_line(&mut self, line: &str) {
        self.result.log.push_str(line);
        self.result.log.push('\n');
    }

    /// Log build target output (stdout/stderr) with a header
    fn log_build_output(&mut self, target: &str, stdout: &str, stderr: &str) {
        self.log_line(&format!("--- make {} ---", target));
        if !stdout.is_empty() {
            self.result.log.push_str(stdout);
            self.result.log.push('\n');
        }
        if !stderr.is_empty() {
            self.result.log.push_str(stderr);
            self.result.log.push('\n');
        }
    }
}

fn read_overlay(overlay: &HashMap<PathBuf, Vec<u8>>, path: &Path) -> Result<Vec<u8>> {
    match overlay.get(path) {
        Some(content) => Ok(content.clone()),
        None => read_existing(path),
    }
}
