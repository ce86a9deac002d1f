// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: CLI entry point for the TAI shell.
// Author: Lukas Bower
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! CLI entry point for the TAI shell.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, LevelFilter};

use taish::{load_config, repl, resolve_config_path, Client, ConfigOverrides, MockClient, Shell};

/// TAI shell command-line arguments.
#[derive(Debug, Parser)]
#[command(author = "Lukas Bower", version, about = "Interactive shell for TAI daemons", long_about = None)]
struct Cli {
    /// Run `;`-separated commands and exit.
    #[arg(short = 'c', long, value_name = "CMDS", conflicts_with = "script")]
    command_string: Option<String>,

    /// Execute commands from a script file instead of starting an interactive shell.
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Render attribute values and notifications as JSON.
    #[arg(short = 'j', long, default_value_t = false)]
    json: bool,

    /// Path to the taish configuration TOML.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// TOML fixture seeding the in-process daemon.
    #[arg(long, value_name = "FILE")]
    fixture: Option<PathBuf>,

    /// Line editor history file.
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(default_level.as_str()));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

/// Ctrl-C raises the returned flag; `monitor` polls it in every mode.
fn install_interrupt() -> Result<Arc<AtomicBool>> {
    let interrupt = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&interrupt);
    ctrlc::set_handler(move || raised.store(true, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;
    Ok(interrupt)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = resolve_config_path(cli.config);
    let config = load_config(config_path.as_deref())?
        .with_overrides(ConfigOverrides {
            json: cli.json,
            fixture: cli.fixture,
            history: cli.history,
        })
        .context("invalid taish configuration")?;

    let client: Rc<dyn Client> = match &config.fixture {
        Some(path) => Rc::new(MockClient::from_fixture(path)?),
        None => Rc::new(MockClient::default()),
    };
    info!("using {} daemon", client.kind());

    let stdout = io::stdout();
    let mut shell = Shell::new(client, stdout)
        .with_json(config.json)
        .with_interrupt(install_interrupt()?);

    if let Some(commands) = cli.command_string {
        return shell.run_batch(&commands);
    }
    if let Some(script_path) = cli.script {
        let file = File::open(&script_path)
            .with_context(|| format!("failed to open script {}", script_path.display()))?;
        return shell.run_script(BufReader::new(file));
    }
    repl::run(&mut shell, config.history.as_deref())
}
