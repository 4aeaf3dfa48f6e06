// src/recipe/filter.rs

//! Template filter: ordered regex rules applied line by line
//!
//! Vendor Makefiles ship every platform profile side by side, with the
//! inactive ones commented out. A recipe selects its profile by rewriting
//! those lines. Each rule is matched against every line of the file (line
//! terminator excluded) and all non-overlapping matches on a line are
//! replaced, the way a stream editor substitutes.
//!
//! Files are handled as bytes. Vendor templates are not always UTF-8
//! (Latin-1 comments are common), and bytes no rule touches are written
//! back unchanged.
//!
//! Rules run strictly in order over the content left by the previous rule,
//! so a rule may target text that an earlier rule produced.

use crate::error::{Error, Result};
use regex::bytes::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A single (pattern, replacement) rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRule {
    /// Regular expression matched against each line
    pub pattern: String,

    /// Replacement text; `${1}` / `$name` refer to capture groups unless
    /// `literal` is set
    pub replacement: String,

    /// Insert the replacement verbatim (no group expansion)
    #[serde(default)]
    pub literal: bool,

    /// Fail instead of silently skipping when no line matches
    #[serde(default)]
    pub required: bool,

    /// Lines matching this pattern are left alone even if `pattern` matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless: Option<String>,
}

impl PatchRule {
    /// Rule whose replacement may reference capture groups
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            literal: false,
            required: false,
            unless: None,
        }
    }

    /// Rule whose replacement is inserted as-is
    ///
    /// Use this for text containing `$`, which Makefiles are full of.
    pub fn literal(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            literal: true,
            ..Self::new(pattern, replacement)
        }
    }

    /// Mark the rule as required to match at least one line
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Skip lines that also match `guard`
    pub fn unless(mut self, guard: impl Into<String>) -> Self {
        self.unless = Some(guard.into());
        self
    }

    fn compile(&self) -> Result<CompiledRule<'_>> {
        let regex = compile_pattern(&self.pattern)?;
        let guard = self.unless.as_deref().map(compile_pattern).transpose()?;
        Ok(CompiledRule {
            rule: self,
            regex,
            guard,
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

struct CompiledRule<'a> {
    rule: &'a PatchRule,
    regex: Regex,
    guard: Option<Regex>,
}

impl CompiledRule<'_> {
    /// Rewrite one line body, returning None when the rule does not apply
    fn rewrite(&self, body: &[u8]) -> Option<Vec<u8>> {
        if !self.regex.is_match(body) {
            return None;
        }
        if self.guard.as_ref().is_some_and(|g| g.is_match(body)) {
            return None;
        }

        let replaced = if self.rule.literal {
            self.regex.replace_all(body, NoExpand(self.rule.replacement.as_bytes()))
        } else {
            self.regex.replace_all(body, self.rule.replacement.as_bytes())
        };
        Some(replaced.into_owned())
    }
}

/// How one rule fared against a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub pattern: String,
    pub required: bool,
    /// Number of lines the rule rewrote
    pub lines_matched: usize,
}

impl RuleOutcome {
    pub fn matched(&self) -> bool {
        self.lines_matched > 0
    }
}

/// Per-rule results of filtering one file
#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    pub file: PathBuf,
    pub rules: Vec<RuleOutcome>,
    /// Whether the content differs from what was read
    pub changed: bool,
}

impl PatchReport {
    /// Rules that matched no line
    pub fn unmatched(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.rules.iter().filter(|r| !r.matched())
    }
}

/// Apply `rules` in order to `content`
///
/// Pure: returns the rewritten bytes and one outcome per rule. Line
/// terminators (`\n` or `\r\n`) are preserved, including a missing
/// terminator on the last line.
pub fn apply_rules(content: &[u8], rules: &[PatchRule]) -> Result<(Vec<u8>, Vec<RuleOutcome>)> {
    let compiled = rules
        .iter()
        .map(PatchRule::compile)
        .collect::<Result<Vec<_>>>()?;

    let mut text = content.to_vec();
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in &compiled {
        let mut out = Vec::with_capacity(text.len());
        let mut lines_matched = 0;

        for line in text.split_inclusive(|&b| b == b'\n') {
            let (body, ending) = split_line_ending(line);
            match rule.rewrite(body) {
                Some(new_body) => {
                    lines_matched += 1;
                    out.extend_from_slice(&new_body);
                }
                None => out.extend_from_slice(body),
            }
            out.extend_from_slice(ending);
        }

        debug!(
            "rule '{}' rewrote {} line(s)",
            rule.rule.pattern, lines_matched
        );
        outcomes.push(RuleOutcome {
            pattern: rule.rule.pattern.clone(),
            required: rule.rule.required,
            lines_matched,
        });
        text = out;
    }

    Ok((text, outcomes))
}

fn split_line_ending(line: &[u8]) -> (&[u8], &[u8]) {
    if let Some(body) = line.strip_suffix(b"\r\n") {
        (body, b"\r\n".as_slice())
    } else if let Some(body) = line.strip_suffix(b"\n") {
        (body, b"\n".as_slice())
    } else {
        (line, b"".as_slice())
    }
}

/// Read a file that must already exist in the staged tree
pub(crate) fn read_existing(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::IoError(format!("Failed to read {}: {}", path.display(), e)),
    })
}

/// Rewrites one template file in place
#[derive(Debug, Clone)]
pub struct TemplateFilter {
    path: PathBuf,
    strict: bool,
}

impl TemplateFilter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            strict: false,
        }
    }

    /// Treat every rule as required
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compute the filtered content without touching the file
    pub fn preview(&self, rules: &[PatchRule]) -> Result<(Vec<u8>, PatchReport)> {
        let original = read_existing(&self.path)?;
        let (content, outcomes) = apply_rules(&original, rules)?;
        let report = PatchReport {
            file: self.path.clone(),
            changed: content != original,
            rules: outcomes,
        };
        Ok((content, report))
    }

    /// Filter the file in place
    ///
    /// Nothing is written if a required rule finds no line to rewrite.
    pub fn filter(&self, rules: &[PatchRule]) -> Result<PatchReport> {
        let (content, report) = self.preview(rules)?;

        for outcome in report.unmatched() {
            if outcome.required || self.strict {
                return Err(Error::RuleNotMatched {
                    file: self.path.clone(),
                    pattern: outcome.pattern.clone(),
                });
            }
            warn!(
                "rule '{}' matched nothing in {}",
                outcome.pattern,
                self.path.display()
            );
        }

        if report.changed {
            fs::write(&self.path, content).map_err(|e| {
                Error::IoError(format!("Failed to write {}: {}", self.path.display(), e))
            })?;
        }

        Ok(report)
    }
}
