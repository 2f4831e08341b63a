//! assetpipe - a front-end asset pipeline with live reload.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod fileset;
mod logger;
mod pipeline;
mod reload;
mod stage;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::{ProjectConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(ProjectConfig::load(cli)?);

    // No subcommand means `serve`
    if cli.is_build() {
        cli::build::build_assets(&config).map(|_| ())
    } else {
        cli::serve::serve()
    }
}
