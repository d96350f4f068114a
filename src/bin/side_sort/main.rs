//! sidesort - Reconcile a photo library with its metadata sidecar files.
//!
//! Indexing tools like PhotoPrism keep per-item metadata in a sidecar tree
//! that mirrors the originals tree. When media is indexed in place, files are
//! neither moved into the canonical date layout nor renamed to their
//! canonical timestamp + checksum names. This tool closes that gap:
//! it matches media files (including bursts and multi-format stacks) to
//! their sidecars, reports orphaned sidecars, and plans and applies the
//! moves and renames with per-file confirmation.

mod config;
mod library;
mod mover;
mod plan;
mod side_sort;
mod sidecar;
mod stack;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::side_sort::SideSort;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Reconcile a photo library with its metadata sidecar files"
)]
pub struct SideSortArgs {
    #[command(subcommand)]
    pub command: Option<SideSortCommand>,

    /// Media originals root directory
    #[arg(short, long, global = true, name = "ORIGINALS", value_hint = clap::ValueHint::DirPath)]
    pub originals: Option<PathBuf>,

    /// Sidecar root directory
    #[arg(short, long, global = true, name = "SIDECAR", value_hint = clap::ValueHint::DirPath)]
    pub sidecar: Option<PathBuf>,

    /// Apply all changes without asking
    #[arg(short, long, global = true)]
    pub auto: bool,

    /// Print debug information
    #[arg(short = 'D', long, global = true)]
    pub debug: bool,

    /// Only print changes without touching any files
    #[arg(short, long, global = true)]
    pub print: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum SideSortCommand {
    /// List sidecar files that have no matching media file
    Orphans,
    /// Move media files into the year/month directory layout
    Organize,
    /// Rename media files to their canonical timestamp and checksum names
    Rename,
    /// Move private or archived media files into a holding directory
    Stash {
        /// Directory name under the originals root to move files into
        folder: String,

        /// Only stash media marked private
        #[arg(long)]
        private: bool,

        /// Only stash archived media
        #[arg(long)]
        archived: bool,
    },
}

fn main() -> Result<()> {
    let args = SideSortArgs::parse();
    if let Some(ref shell) = args.completion {
        sidecar_tools::generate_shell_completion(*shell, SideSortArgs::command(), true, env!("CARGO_BIN_NAME"))
    } else if args.command.is_some() {
        SideSort::new(args)?.run()
    } else {
        SideSortArgs::command().print_help()?;
        Ok(())
    }
}
