// tests/workflow.rs

//! Patching behavior observed through the public API and host processes.

mod common;

use m3cook::recipe::{parse_recipe, parse_rules};
use m3cook::{BuildContext, Kitchen, KitchenConfig, PatchRule, TemplateFilter};
use std::fs;

#[test]
fn test_bin_rule_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let makefile = dir.path().join("Makefile.template");
    fs::write(&makefile, "# I/O API build\n#BIN = Linux2_x86_64\nall: lib\n").unwrap();

    let rules = [PatchRule::new(
        r"^#\s*(BIN\s*=\s*Linux2_x86_64)",
        "BIN     = Linux2_x86_64ifx",
    )];
    TemplateFilter::new(&makefile).filter(&rules).unwrap();

    let content = fs::read_to_string(&makefile).unwrap();
    assert!(content.lines().any(|l| l == "BIN     = Linux2_x86_64ifx"));
    assert!(!content.lines().any(|l| l == "#BIN = Linux2_x86_64"));
}

#[test]
fn test_rule_file_applies_in_order() {
    let rules = parse_rules(
        r#"
[[rule]]
pattern = '^#(CPLMODE\s*=\s*nocpl)'
replacement = '${1}'

[[rule]]
pattern = '^CPLMODE\s*=\s*nocpl$'
replacement = 'CPLMODE = nocpl # selected'
literal = true
"#,
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Makefile");
    fs::write(&path, "#CPLMODE = nocpl\n").unwrap();

    let report = TemplateFilter::new(&path).filter(&rules).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "CPLMODE = nocpl # selected\n");
    assert!(report.rules.iter().all(|r| r.lines_matched == 1));

    // Reversed, the second rule has nothing to match yet
    fs::write(&path, "#CPLMODE = nocpl\n").unwrap();
    let reversed: Vec<_> = rules.iter().rev().cloned().collect();
    let report = TemplateFilter::new(&path).filter(&reversed).unwrap();
    assert_eq!(report.rules[0].lines_matched, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "CPLMODE = nocpl\n");
}

#[cfg(unix)]
mod host {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(path: &Path, body: &str) {
        fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    const RECIPE: &str = r#"
[package]
name = "toolkit"
version = "1.0"
bin = "Linux2_x86_64ifx"

[queries.nclibs]
program = "nc-config"
args = ["--libs"]

[[edit]]
action = "filter"
file = "Makeinclude"
rules = [
    { pattern = '^IOLIB\s*=.*', replacement = 'IOLIB = -lioapi %(query.nclibs)s', literal = true, required = true },
]

[[edit]]
action = "make"
target = "dir"
"#;

    #[test]
    fn test_failing_query_program_never_reaches_make() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("Makeinclude"), "IOLIB = -lioapi -lnetcdf\n").unwrap();

        let marker = dir.path().join("make-ran");
        let make = dir.path().join("fake-make");
        script(&make, &format!("touch {}", marker.display()));
        let nc_config = dir.path().join("nc-config");
        script(&nc_config, "echo 'nc-config: netCDF not built with --libs support' >&2\nexit 1");

        let mut config = KitchenConfig {
            make_program: make.display().to_string(),
            recipe_dir: None,
            ..Default::default()
        };
        config
            .program_overrides
            .insert("nc-config".to_string(), nc_config.display().to_string());

        let recipe = parse_recipe(RECIPE).unwrap();
        let ctx = BuildContext::new(&source, dir.path().join("prefix"));
        let err = Kitchen::new(config).edit(&recipe, &ctx).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("nc-config --libs"));
        assert!(message.contains("exit status 1"));
        assert!(message.contains("netCDF not built with --libs support"));
        assert!(!marker.exists());
        assert_eq!(
            fs::read_to_string(source.join("Makeinclude")).unwrap(),
            "IOLIB = -lioapi -lnetcdf\n"
        );
    }

    #[test]
    fn test_host_cook_runs_make_in_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("Makeinclude"), "IOLIB = -lioapi -lnetcdf\n").unwrap();

        let make = dir.path().join("fake-make");
        script(&make, "echo \"$1\" >> targets.log");
        let nc_config = dir.path().join("nc-config");
        script(&nc_config, "echo ' -L/opt/netcdf/lib -lnetcdf '");

        let mut config = KitchenConfig {
            make_program: make.display().to_string(),
            recipe_dir: None,
            ..Default::default()
        };
        config
            .program_overrides
            .insert("nc-config".to_string(), nc_config.display().to_string());

        let recipe = parse_recipe(RECIPE).unwrap();
        let ctx = BuildContext::new(&source, dir.path().join("prefix"));
        let result = Kitchen::new(config).edit(&recipe, &ctx).unwrap();

        assert_eq!(
            fs::read_to_string(source.join("Makeinclude")).unwrap(),
            "IOLIB = -lioapi -L/opt/netcdf/lib -lnetcdf\n"
        );
        assert_eq!(fs::read_to_string(source.join("targets.log")).unwrap(), "dir\n");
        assert_eq!(result.targets, ["dir"]);
    }
}
