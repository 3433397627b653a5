//! Machine status command

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;

pub async fn show_machine(config: &Config) -> Result<()> {
    let client = config.machine();
    let info = client
        .machine_info()
        .await
        .with_context(|| format!("Failed to reach machine at {}", client.base_url()))?;

    println!("{}", "Machine:".bold());
    println!("  URL:      {}", client.base_url().cyan());
    if let Some(version) = &info.version {
        println!("  Version:  {}", version);
    }
    if let Some(uptime) = info.uptime {
        println!("  Uptime:   {}s", uptime.round());
    }
    if let Some(jobs) = &info.jobs {
        println!(
            "  Jobs:     {} total, {} waiting, {} running",
            jobs.total,
            jobs.waiting.to_string().yellow(),
            jobs.running.to_string().cyan()
        );
    }
    for (key, value) in &info.extra {
        println!("  {}: {}", key.dimmed(), value);
    }

    Ok(())
}
