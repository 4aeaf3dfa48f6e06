// src/recipe/kitchen/toolchain.rs

//! External programs a cook runs: the native build tool and configuration
//! queries such as `nc-config --libs`
//!
//! Every invocation blocks until the program exits. No timeout is applied.

use crate::error::{Error, Result};
use crate::recipe::format::QuerySpec;
use crate::recipe::kitchen::KitchenConfig;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Captured output of a build target
#[derive(Debug, Clone, Default)]
pub struct MakeOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs build targets and configuration queries
pub trait Toolchain: Send + Sync {
    /// Run one native build target in `workdir`
    fn make(&self, target: &str, workdir: &Path) -> Result<MakeOutput>;

    /// Run a configuration query and return its trimmed standard output
    fn query(&self, spec: &QuerySpec) -> Result<String>;
}

/// Toolchain that runs programs on the host
#[derive(Debug, Clone)]
pub struct HostToolchain {
    make_program: String,
    jobs: Option<u32>,
    overrides: BTreeMap<String, String>,
}

impl HostToolchain {
    pub fn new(config: &KitchenConfig) -> Self {
        Self {
            make_program: config.make_program.clone(),
            jobs: config.jobs,
            overrides: config.program_overrides.clone(),
        }
    }
}

impl Toolchain for HostToolchain {
    fn make(&self, target: &str, workdir: &Path) -> Result<MakeOutput> {
        let program = which::which(&self.make_program).map_err(|e| {
            Error::NotFound(format!("build tool '{}': {}", self.make_program, e))
        })?;
        debug!("{} {} in {}", program.display(), target, workdir.display());

        let mut cmd = Command::new(&program);
        cmd.arg(target).current_dir(workdir);
        if let Some(jobs) = self.jobs {
            cmd.env("MAKEFLAGS", format!("-j{}", jobs));
        }

        let output = cmd
            .output()
            .map_err(|e| Error::IoError(format!("Failed to run make {}: {}", target, e)))?;

        let result = MakeOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(Error::BuildFailed {
                target: target.to_string(),
                code: output.status.code(),
                stderr: result.stderr,
            });
        }

        Ok(result)
    }

    fn query(&self, spec: &QuerySpec) -> Result<String> {
        let program = self
            .overrides
            .get(&spec.program)
            .map(String::as_str)
            .unwrap_or(spec.program.as_str());
        debug!("querying {} {:?}", program, spec.args);

        let output = Command::new(program)
            .args(&spec.args)
            .output()
            .map_err(|e| Error::ConfigQuery {
                program: spec.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = match output.status.code() {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            };
            return Err(Error::ConfigQuery {
                program: spec.to_string(),
                message: format!("{}: {}", status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
