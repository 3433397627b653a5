//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod machine;
mod recipe;

pub use job::JobCommands;
pub use recipe::RecipeCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::{ColoredString, Colorize};
use kiln_core::TaskState;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show machine status
    Machine,
    /// Browse the recipe catalog
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
}

/// Route a command to its handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Machine => machine::show_machine(config).await,
        Commands::Recipe { command } => recipe::handle_recipe_command(command, config).await,
        Commands::Job { command } => job::handle_job_command(command, config).await,
    }
}

/// Colorize a job or step state for display
fn colorize_state(state: TaskState) -> ColoredString {
    let label = state.as_str();
    match state {
        TaskState::Created => label.normal(),
        TaskState::Waiting => label.yellow(),
        TaskState::Running => label.cyan(),
        TaskState::Done => label.green(),
        TaskState::Error => label.red(),
        TaskState::Cancelled => label.dimmed(),
    }
}
