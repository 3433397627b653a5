//! Recipe command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use kiln_core::{Recipe, RecipeSummary};

use crate::config::Config;

/// Recipe subcommands
#[derive(Subcommand)]
pub enum RecipeCommands {
    /// List the recipes the machine offers
    List,
    /// Show a recipe and its parameters
    Get {
        /// Recipe ID
        id: String,
    },
}

pub async fn handle_recipe_command(command: RecipeCommands, config: &Config) -> Result<()> {
    let client = config.machine();

    match command {
        RecipeCommands::List => {
            let recipes = client
                .list_recipes()
                .await
                .context("Failed to list recipes")?;
            print_recipe_list(&recipes);
        }
        RecipeCommands::Get { id } => {
            let recipe = client
                .get_recipe(&id)
                .await
                .with_context(|| format!("Failed to load recipe '{}'", id))?;
            print_recipe_details(&recipe);
        }
    }

    Ok(())
}

fn print_recipe_list(recipes: &[RecipeSummary]) {
    if recipes.is_empty() {
        println!("{}", "No recipes found.".yellow());
        return;
    }

    println!("{}", format!("Found {} recipe(s):", recipes.len()).bold());
    println!();
    for recipe in recipes {
        println!("  {} {} {}", "▸".cyan(), recipe.id.bold(), recipe.version.dimmed());
        println!("    {}", recipe.name);
        if !recipe.description.is_empty() {
            println!("    {}", recipe.description.dimmed());
        }
    }
}

fn print_recipe_details(recipe: &Recipe) {
    println!("{}", "Recipe Details:".bold());
    println!("  ID:          {}", recipe.id.cyan());
    println!("  Name:        {}", recipe.name);
    if !recipe.version.is_empty() {
        println!("  Version:     {}", recipe.version);
    }
    if !recipe.description.is_empty() {
        println!("  Description: {}", recipe.description);
    }

    let schema = &recipe.parameter_schema;
    if schema.properties().is_empty() {
        println!("\n{}", "No parameters.".dimmed());
        return;
    }

    println!("\n{}", "Parameters:".bold());
    for (name, prop) in schema.properties() {
        let mut kind = prop.kind.to_string();
        if prop.is_file() {
            kind.push_str(", file");
        }
        let marker = if schema.is_required(name) {
            "*".red()
        } else {
            " ".normal()
        };

        println!("  {}{} ({})", name.cyan(), marker, kind.dimmed());
        if let Some(title) = prop.title.as_ref().or(prop.description.as_ref()) {
            println!("      {}", title);
        }
        if let Some(default) = &prop.default {
            println!("      default: {}", default);
        }
        if let Some(allowed) = &prop.allowed {
            let allowed: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
            println!("      one of:  {}", allowed.join(", "));
        }
    }
}
