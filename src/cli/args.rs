//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Front-end asset pipeline: Sass, script bundling, images, cache busting
/// and live reload.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: assetpipe.toml)
    #[arg(short = 'C', long, global = true, default_value = "assetpipe.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands (default: serve)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the pipeline once and exit
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Run the pipeline, then watch and serve with live reload
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        #[command(flatten)]
        serve_args: ServeArgs,
    },
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Minify stylesheets and scripts
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Emit stylesheet source maps
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub sourcemaps: Option<bool>,

    /// Run tasks one at a time in declaration order
    #[arg(long)]
    pub sequential: bool,
}

/// Development server arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<std::net::IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable file watching for auto-rebuild
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub watch: Option<bool>,
}

impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Some(Commands::Build { .. }))
    }

    /// Build arguments of the active command (defaults when none given).
    pub fn build_args(&self) -> BuildArgs {
        match &self.command {
            Some(Commands::Build { build_args } | Commands::Serve { build_args, .. }) => {
                build_args.clone()
            }
            None => BuildArgs::default(),
        }
    }

    /// Serve arguments, present only in serve mode.
    pub fn serve_args(&self) -> Option<ServeArgs> {
        match &self.command {
            Some(Commands::Serve { serve_args, .. }) => Some(serve_args.clone()),
            Some(Commands::Build { .. }) => None,
            None => Some(ServeArgs::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_serve() {
        let cli = Cli::parse_from(["assetpipe"]);
        assert!(!cli.is_build());
        assert!(cli.serve_args().is_some());
        assert_eq!(cli.config, PathBuf::from("assetpipe.toml"));
    }

    #[test]
    fn test_build_flags() {
        let cli = Cli::parse_from(["assetpipe", "build", "--minify=false", "--sequential"]);
        assert!(cli.is_build());
        let args = cli.build_args();
        assert_eq!(args.minify, Some(false));
        assert_eq!(args.sourcemaps, None);
        assert!(args.sequential);
        assert!(cli.serve_args().is_none());
    }

    #[test]
    fn test_bare_bool_flag() {
        let cli = Cli::parse_from(["assetpipe", "build", "--sourcemaps"]);
        assert_eq!(cli.build_args().sourcemaps, Some(true));
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::parse_from(["assetpipe", "serve", "-p", "4000", "--watch", "false"]);
        let serve = cli.serve_args().unwrap();
        assert_eq!(serve.port, Some(4000));
        assert_eq!(serve.watch, Some(false));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["assetpipe", "build", "-o", "public", "-v"]);
        assert_eq!(cli.output, Some(PathBuf::from("public")));
        assert!(cli.verbose);
    }
}
