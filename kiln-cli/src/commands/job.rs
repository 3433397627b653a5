//! Job command handlers
//!
//! Submitting, inspecting and controlling jobs, and collecting their result
//! files.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::Colorize;
use kiln_core::{JobInfo, JobReport, Priority, Recipe, TaskState};

use super::colorize_state;
use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Validate parameters, create a job and upload its input files
    Submit {
        /// Recipe ID
        recipe: String,

        /// Parameters as key=value pairs (e.g., meshFile=bunny.obj)
        #[arg(short, long, value_parser = parse_key_val)]
        param: Vec<(String, String)>,

        /// Job name (generated when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Scheduling priority: low, normal or high
        #[arg(long, default_value = "normal")]
        priority: Priority,

        /// Start the job once its files are uploaded
        #[arg(long)]
        run: bool,
    },
    /// Show a job's current state
    Status {
        /// Job ID
        id: String,
    },
    /// Show a job's execution report
    Report {
        /// Job ID
        id: String,
    },
    /// Start a created job
    Run {
        /// Job ID
        id: String,
    },
    /// Cancel a waiting or running job
    Cancel {
        /// Job ID
        id: String,
    },
    /// Delete a job and its files
    Delete {
        /// Job ID
        id: String,
    },
    /// Wait until a job finishes
    Wait {
        /// Job ID
        id: String,
    },
    /// Download the files a finished job delivered
    Fetch {
        /// Job ID
        id: String,

        /// Directory to download into
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Wait for the job to finish first
        #[arg(long)]
        wait: bool,
    },
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    match command {
        JobCommands::Submit {
            recipe,
            param,
            name,
            priority,
            run,
        } => submit_job(config, &recipe, param, name, priority, run).await,
        JobCommands::Status { id } => {
            let info = config
                .orchestrator()?
                .job_info(&id)
                .await
                .with_context(|| format!("Failed to get job {}", id))?;
            print_job_details(&info);
            Ok(())
        }
        JobCommands::Report { id } => {
            let report = config
                .orchestrator()?
                .job_report(&id)
                .await
                .with_context(|| format!("Failed to get report of job {}", id))?;
            print_job_report(&report);
            Ok(())
        }
        JobCommands::Run { id } => {
            config.orchestrator()?.run_job(&id).await?;
            println!("{} Job {} started", "✓".green(), id.cyan());
            Ok(())
        }
        JobCommands::Cancel { id } => {
            config.orchestrator()?.cancel_job(&id).await?;
            println!("{} Job {} cancelled", "✓".green(), id.cyan());
            Ok(())
        }
        JobCommands::Delete { id } => {
            config.orchestrator()?.delete_job(&id).await?;
            println!("{} Job {} deleted", "✓".green(), id.cyan());
            Ok(())
        }
        JobCommands::Wait { id } => wait_job(config, &id).await,
        JobCommands::Fetch { id, output, wait } => fetch_files(config, &id, output, wait).await,
    }
}

/// Build an order from recipe defaults and command-line values, then submit
async fn submit_job(
    config: &Config,
    recipe_id: &str,
    params: Vec<(String, String)>,
    name: Option<String>,
    priority: Priority,
    run: bool,
) -> Result<()> {
    let orchestrator = config.orchestrator()?;
    let recipe = orchestrator
        .api()
        .get_recipe(recipe_id)
        .await
        .with_context(|| format!("Failed to load recipe '{}'", recipe_id))?;

    let mut order = orchestrator
        .new_order(&recipe.id)
        .with_parameters(recipe.parameter_schema.defaults())
        .with_priority(priority);
    if let Some(name) = name {
        order = order.with_name(name);
    }
    for (key, raw) in params {
        let value = recipe.parameter_schema.coerce(&key, &raw)?;
        order = order.with_parameter(key, value);
    }

    print_order_preview(&recipe, &order.parameters);

    let submission = orchestrator.submit(&recipe, order).await?;

    println!(
        "{} Job {} created",
        "✓".green(),
        submission.job_id.cyan().bold()
    );
    for path in &submission.uploaded {
        println!("  {} {}", "↑".green(), path.display());
    }
    for path in &submission.skipped {
        println!(
            "  {} {} {}",
            "⚠".yellow(),
            path.display(),
            "(not found locally, skipped)".dimmed()
        );
    }

    if run {
        orchestrator.run_job(&submission.job_id).await?;
        println!("{} Job started", "✓".green());
    } else {
        println!(
            "{}",
            format!("  Start it with: kiln job run {}", submission.job_id).dimmed()
        );
    }

    Ok(())
}

async fn wait_job(config: &Config, id: &str) -> Result<()> {
    let orchestrator = config.orchestrator()?;
    println!("Waiting for job {}...", id.cyan());

    let state = orchestrator.wait_done(id).await?;
    println!("Job {} finished: {}", id.cyan(), colorize_state(state));

    if state == TaskState::Error {
        let info = orchestrator.job_info(id).await?;
        bail!("job {} failed: {}", id, info.error);
    }
    Ok(())
}

async fn fetch_files(config: &Config, id: &str, output: PathBuf, wait: bool) -> Result<()> {
    let orchestrator = config.orchestrator()?;

    let files = if wait {
        println!("Waiting for job {}...", id.cyan());
        orchestrator.wait_fetch_result_files(id, &output).await?
    } else {
        orchestrator.fetch_result_files(id, &output).await?
    };

    println!(
        "{}",
        format!("Downloaded {} file(s) to {}:", files.len(), output.display()).bold()
    );
    for file in files {
        println!("  {} {}", "↓".green(), file.display());
    }
    Ok(())
}

fn print_order_preview(recipe: &Recipe, parameters: &kiln_core::Parameters) {
    println!("{} {}", "Submitting".bold(), recipe.name.cyan());
    for name in recipe.parameter_schema.properties().keys() {
        if let Some(value) = parameters.get(name) {
            println!("  {} = {}", name.cyan(), value);
        }
    }
}

/// Print detailed job information
fn print_job_details(job: &JobInfo) {
    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.cyan());
    if !job.name.is_empty() {
        println!("  Name:      {}", job.name);
    }
    println!("  Recipe:    {}", job.recipe.id);
    println!("  State:     {}", colorize_state(job.state));
    println!("  Priority:  {:?}", job.priority);
    if !job.step.is_empty() {
        println!("  Step:      {}", job.step);
    }
    if let Some(submitted) = job.submission {
        println!("  Submitted: {}", submitted.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(started) = job.start {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(ended) = job.end {
        println!("  Ended:     {}", ended.format("%Y-%m-%d %H:%M:%S"));
        println!("  Duration:  {:.1}s", job.duration);
    }
    if !job.error.is_empty() {
        println!("\n{}", "Error:".bold());
        println!("{}", job.error.red());
    }
}

fn print_job_report(report: &JobReport) {
    print_job_details(&report.job);

    if report.steps.is_empty() {
        return;
    }

    println!("\n{}", "Steps:".bold());
    for (name, step) in &report.steps {
        println!(
            "  {} {} [{}] {}",
            "▸".cyan(),
            name.bold(),
            colorize_state(step.state),
            step.tool.dimmed()
        );
        if step.duration > 0.0 {
            println!("    Duration: {:.1}s", step.duration);
        }
        if !step.error.is_empty() {
            println!("    Error:    {}", step.error.red());
        }
        if let Some(files) = step.result.as_ref().and_then(|r| r.files.as_ref()) {
            for (label, path) in files {
                println!("    {} {}", format!("{label}:").dimmed(), path);
            }
        }
    }
}
