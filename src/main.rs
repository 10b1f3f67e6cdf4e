use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use release_flow::cli::{self, ReleaseArgs, TagReleaseArgs};
use release_flow::{config, ui};

#[derive(clap::Parser)]
#[command(
    name = "release-flow",
    version,
    about = "Tag, publish and bump the version of a project release"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(
        short = 'C',
        long,
        global = true,
        help = "Project directory (defaults to the current directory)"
    )]
    directory: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v debug, -vv trace)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Release the version recorded in the project properties file
    Release {
        #[arg(long, help = "Check preconditions and print the plan without changing anything")]
        dry_run: bool,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Create and push an annotated tag for an explicit version
    #[command(alias = "tagRelease")]
    TagRelease {
        #[arg(help = "Version to tag, e.g. 0.3.0")]
        version: Option<String>,

        #[arg(help = "Commit to tag (defaults to HEAD)")]
        commitish: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> Result<()> {
    let project_dir = match args.directory {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };

    let config = config::load_config(args.config.as_deref(), &project_dir)?;
    log::debug!("configuration: {:?}", config);

    match args.command {
        Command::Release { dry_run, yes } => cli::run_release(
            &config,
            &project_dir,
            &ReleaseArgs {
                dry_run,
                assume_yes: yes,
            },
        ),
        Command::TagRelease { version, commitish } => cli::run_tag_release(
            &config,
            &project_dir,
            &TagReleaseArgs { version, commitish },
        ),
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
