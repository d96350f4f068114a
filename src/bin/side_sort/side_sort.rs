use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use sidecar_tools::{get_relative_path_or_filename, path_to_string, print_bold, print_warning};

use crate::config::Config;
use crate::library::Library;
use crate::plan::{self, MovePlan};
use crate::{SideSortArgs, SideSortCommand, mover};

pub struct SideSort {
    command: SideSortCommand,
    config: Config,
    library: Library,
}

impl SideSort {
    pub fn new(mut args: SideSortArgs) -> Result<Self> {
        let command = args.command.take().context("No command given")?;
        let config = Config::from_args(&args)?;
        if config.debug {
            eprintln!("Config: {config:#?}");
        }
        let library = Library::new(config.originals_root.clone(), config.sidecar_root.clone());
        Ok(Self {
            command,
            config,
            library,
        })
    }

    pub fn run(&self) -> Result<()> {
        match &self.command {
            SideSortCommand::Orphans => self.report_orphans(),
            SideSortCommand::Organize => self.organize(),
            SideSortCommand::Rename => self.rename(),
            SideSortCommand::Stash {
                folder,
                private,
                archived,
            } => self.stash(folder, *private, *archived),
        }
    }

    /// List sidecar files with no matching media file under the originals root.
    fn report_orphans(&self) -> Result<()> {
        let sidecars = self.collect_sidecars()?;
        let orphans = self.library.find_orphans(&sidecars)?;
        if orphans.is_empty() {
            println!("No orphaned sidecar files");
            return Ok(());
        }

        print_bold!("{} orphaned sidecar file(s):", orphans.len());
        for orphan in &orphans {
            println!("  {}", get_relative_path_or_filename(orphan, &self.config.sidecar_root));
        }
        Ok(())
    }

    /// Move media files into the `<year>/<month>` layout under the originals root.
    fn organize(&self) -> Result<()> {
        let sidecars = self.collect_sidecars()?;
        let stacks = self.library.media_stacks(&sidecars)?;

        // Bursts legitimately map many media files to one sidecar,
        // but a sidecar with no media at all deserves a warning.
        let missing = stacks.iter().filter(|stack| stack.media_paths.is_empty()).count();
        if missing > 0 {
            print_warning!("{missing} sidecar file(s) have no matching media");
        }

        let plans = plan::plan_moves(&self.library, &stacks)?;
        self.apply("Move", &plans)
    }

    /// Rename media files to the canonical timestamp + checksum pattern.
    fn rename(&self) -> Result<()> {
        let sidecars = self.collect_sidecars()?;
        let plans = plan::plan_renames(&self.library, &sidecars, self.config.verbose)?;
        self.apply("Rename", &plans)
    }

    /// Move private or archived media into a holding directory.
    /// With neither flag set, both kinds are stashed.
    fn stash(&self, folder: &str, private: bool, archived: bool) -> Result<()> {
        let (include_private, include_archived) = if private || archived {
            (private, archived)
        } else {
            (true, true)
        };

        let sidecars = self.collect_sidecars()?;
        let plans = plan::plan_stash(&self.library, &sidecars, folder, include_private, include_archived)?;
        self.apply("Move", &plans)
    }

    fn collect_sidecars(&self) -> Result<Vec<PathBuf>> {
        let sidecars = self.library.collect_sidecars(&self.config.sidecar_extensions)?;
        if self.config.verbose {
            println!(
                "Found {} sidecar files under {}",
                sidecars.len(),
                self.config.sidecar_root.display()
            );
        }
        Ok(sidecars)
    }

    fn apply(&self, action: &str, plans: &[MovePlan]) -> Result<()> {
        println!("Found {} file(s) that need changes", plans.len());
        if plans.is_empty() {
            return Ok(());
        }
        if self.config.dryrun {
            for plan in plans {
                println!("{}", "Dryrun:".cyan().bold());
                sidecar_tools::show_diff(&path_to_string(&plan.current), &path_to_string(&plan.target));
            }
            return Ok(());
        }
        mover::execute_moves(action, plans, !self.config.auto)
    }
}
