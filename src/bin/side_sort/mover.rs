use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use sidecar_tools::path_to_string;

use crate::plan::MovePlan;

/// Whether the next batch item should still ask for confirmation.
///
/// The "apply all" choice flips the state to `AutoConfirm`. The updated
/// value is returned from each step and threaded into the next one, so the
/// carry-over is an explicit value instead of a shared mutable flag, and it
/// is scoped to a single batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Prompt,
    AutoConfirm,
}

/// The three answers the confirmation prompt accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Apply,
    Skip,
    ApplyAll,
}

impl Choice {
    /// Map prompt input to a choice.
    /// Anything unrecognized is an error: the prompt has exactly three answers.
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(Self::Apply),
            "n" | "no" => Ok(Self::Skip),
            "a" | "all" => Ok(Self::ApplyAll),
            other => anyhow::bail!("Unhandled choice: '{other}'"),
        }
    }
}

/// Execute the given plans strictly in input order.
///
/// Prompting state is threaded from one item to the next, so "apply all"
/// covers the rest of this batch only. Separate batches prompt independently.
pub fn execute_moves(action: &str, plans: &[MovePlan], prompt: bool) -> Result<()> {
    let mut state = if prompt {
        PromptState::Prompt
    } else {
        PromptState::AutoConfirm
    };

    let total = plans.len();
    for (index, plan) in plans.iter().enumerate() {
        state = move_file(action, &plan.current, &plan.target, state, index + 1, total)?;
    }

    println!("---");
    println!("Finished processing {total} files");
    Ok(())
}

/// Move or rename one file, creating the target directory if needed.
///
/// Returns the prompt state the next batch item should use.
pub fn move_file(
    action: &str,
    current: &Path,
    target: &Path,
    state: PromptState,
    index: usize,
    total: usize,
) -> Result<PromptState> {
    if let Some(target_dir) = target.parent()
        && !target_dir.exists()
    {
        println!("Target directory does not exist, creating {}", target_dir.display());
        fs::create_dir_all(target_dir)
            .with_context(|| format!("Failed to create directory {}", target_dir.display()))?;
    }

    println!("{}", format!("{index}/{total} {action}:").bold());
    sidecar_tools::show_diff(&path_to_string(current), &path_to_string(target));

    let rename = || {
        fs::rename(current, target).with_context(|| {
            format!(
                "Failed to {} {} to {}",
                action.to_lowercase(),
                current.display(),
                target.display()
            )
        })
    };

    match state {
        PromptState::AutoConfirm => {
            rename()?;
            Ok(PromptState::AutoConfirm)
        }
        PromptState::Prompt => {
            print!("{}", format!("{action} file? (y/n/a = {action} all): ").magenta());
            std::io::stdout().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            match Choice::parse(&input)? {
                Choice::Apply => {
                    rename()?;
                    Ok(PromptState::Prompt)
                }
                Choice::Skip => {
                    println!("Skipped");
                    Ok(PromptState::Prompt)
                }
                Choice::ApplyAll => {
                    rename()?;
                    Ok(PromptState::AutoConfirm)
                }
            }
        }
    }
}
