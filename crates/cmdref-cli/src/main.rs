// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use cmdref_app::ShellState;
use cmdref_registry::ManifestStore;
use config::Config;
use runtime::StoreRuntime;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `cmdref --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let manifest_dir = match &options.manifest_dir {
        Some(dir) => PathBuf::from(dir),
        None => config.manifest_dir()?,
    };
    if options.print_manifest_dir {
        println!("{}", manifest_dir.display());
        return Ok(());
    }

    let store = if options.demo {
        ManifestStore::seed_demo()
    } else {
        ManifestStore::load_dir(&manifest_dir).with_context(|| {
            format!(
                "load command manifests from {} -- if this path is wrong, set [registry].manifest_dir or pass --manifests",
                manifest_dir.display()
            )
        })?
    };
    if options.check_only {
        return Ok(());
    }

    let mut shell = ShellState::default();
    let mut runtime = StoreRuntime::new(store);
    cmdref_tui::run_app(&mut shell, &mut runtime, config.open_reference_on_start())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    manifest_dir: Option<String>,
    print_config_path: bool,
    print_manifest_dir: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        manifest_dir: None,
        print_config_path: false,
        print_manifest_dir: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--manifests" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--manifests requires a directory path"))?;
                options.manifest_dir = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_manifest_dir = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("cmdref — commands reference panel");
    println!("  --config <path>          Use a specific config path");
    println!("  --manifests <dir>        Load plugin manifests from this directory");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved manifest directory");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch against a seeded in-memory registry");
    println!("  --check                  Validate config + manifests and exit");
    println!("  --help                   Show this help");
}
