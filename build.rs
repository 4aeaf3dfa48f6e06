// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe name or path
fn recipe_arg() -> Arg {
    Arg::new("recipe")
        .required(true)
        .help("Built-in recipe name or path to a recipe file")
}

/// Common argument: staged source directory
fn source_arg() -> Arg {
    Arg::new("source")
        .short('s')
        .long("source")
        .required(true)
        .help("Staged source directory")
}

/// Common argument: install prefix
fn prefix_arg() -> Arg {
    Arg::new("prefix")
        .short('p')
        .long("prefix")
        .required(true)
        .help("Install prefix")
}

/// Common argument: dependency prefixes
fn dep_arg() -> Arg {
    Arg::new("dep")
        .short('d')
        .long("dep")
        .value_name("NAME=PATH")
        .action(ArgAction::Append)
        .help("Dependency install prefix")
}

/// Common argument: query program replacements
fn tool_arg() -> Arg {
    Arg::new("tool")
        .long("tool")
        .value_name("NAME=PATH")
        .action(ArgAction::Append)
        .help("Replacement for a query program")
}

/// Common argument: user recipe directory
fn recipe_dir_arg() -> Arg {
    Arg::new("recipe_dir")
        .long("recipe-dir")
        .value_name("DIR")
        .help("Directory searched for user recipes")
}

fn build_cli() -> Command {
    Command::new("m3cook")
        .version(env!("CARGO_PKG_VERSION"))
        .author("m3cook Contributors")
        .about("Build recipes for the Models-3 I/O API and SMOKE")
        .subcommand_required(false)
        .subcommand(Command::new("list").about("List built-in recipes"))
        .subcommand(
            Command::new("show")
                .about("Show the steps of a recipe")
                .arg(recipe_arg())
                .arg(recipe_dir_arg()),
        )
        .subcommand(
            Command::new("cook")
                .about("Cook a recipe against a staged source tree")
                .arg(recipe_arg())
                .arg(source_arg())
                .arg(prefix_arg())
                .arg(dep_arg())
                .arg(
                    Arg::new("phase")
                        .long("phase")
                        .value_parser(["all", "edit", "install"])
                        .default_value("all")
                        .help("Phases to run"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail when any patch rule matches nothing"),
                )
                .arg(Arg::new("make").long("make").default_value("make").help("Native build tool"))
                .arg(Arg::new("jobs").short('j').long("jobs").help("Parallel build jobs"))
                .arg(tool_arg())
                .arg(recipe_dir_arg())
                .arg(
                    Arg::new("show_log")
                        .long("show-log")
                        .action(ArgAction::SetTrue)
                        .help("Print the build log when done"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report which patch rules would match, without changing anything")
                .arg(recipe_arg())
                .arg(source_arg())
                .arg(prefix_arg())
                .arg(dep_arg())
                .arg(tool_arg())
                .arg(recipe_dir_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                ),
        )
        .subcommand(
            Command::new("patch")
                .about("Apply a rule file to a single file")
                .arg(Arg::new("file").required(true).help("File to rewrite in place"))
                .arg(
                    Arg::new("rules")
                        .short('r')
                        .long("rules")
                        .required(true)
                        .help("TOML file of [[rule]] tables"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail when any rule matches nothing"),
                )
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the result instead of writing it"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=recipes");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    if let Err(e) = fs::write(man_dir.join("m3cook.1"), buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
