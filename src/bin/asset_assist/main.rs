mod assist;
mod config;
mod logger;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use asset_assistant::assets::Service;

use crate::assist::AssetAssist;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Match staged artwork to library directories and rename it for the target service"
)]
pub(crate) struct AssistArgs {
    /// Optional staging directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Use the given config file instead of the default location
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Target service naming convention
    #[arg(long, value_enum)]
    service: Option<Service>,

    /// Movies library directory
    #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    movies: Option<PathBuf>,

    /// Shows library directory
    #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    shows: Option<PathBuf>,

    /// Collections library directory
    #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    collections: Option<PathBuf>,

    /// Directory for assets that could not be placed
    #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    failed: Option<PathBuf>,

    /// Directory for backup copies
    #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    backup: Option<PathBuf>,

    /// Name the season zero directory "Specials"
    #[arg(short, long, conflicts_with = "numeric_specials")]
    specials: bool,

    /// Name the season zero directory "Season 00"
    #[arg(short, long)]
    numeric_specials: bool,

    /// Keep existing destination files instead of overwriting them
    #[arg(short, long)]
    keep: bool,

    /// Copy staged files to the backup directory before moving
    #[arg(long)]
    backup_source: bool,

    /// Copy replaced destination files to the backup directory
    #[arg(long)]
    backup_destination: bool,

    /// Do not move files from staging subdirectories to the staging root
    #[arg(long)]
    no_flatten: bool,

    /// Only print changes without moving files
    #[arg(short, long)]
    print: bool,

    /// Write a run log file
    #[arg(short = 'L', long)]
    log: bool,

    /// Print debug information
    #[arg(short = 'D', long)]
    debug: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = AssistArgs::parse();
    if let Some(ref shell) = args.completion {
        asset_assistant::generate_shell_completion(*shell, AssistArgs::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        AssetAssist::new(args)?.run()
    }
}
