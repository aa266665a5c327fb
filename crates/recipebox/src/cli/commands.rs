//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::recipe::RecipeDraft;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show recipes in this category ("All" shows everything)
    #[arg(long)]
    pub category: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Recipe id
    pub id: String,

    /// Look the id up in favorites instead of recipes
    #[arg(long)]
    pub favorite: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Recipe title
    #[arg(long)]
    pub title: String,

    /// Category label
    #[arg(long)]
    pub category: String,

    /// Ingredients, one per line
    #[arg(long)]
    pub ingredients: String,

    /// Preparation steps
    #[arg(long)]
    pub instructions: String,

    /// Cooking temperature in °C
    #[arg(long)]
    pub temperature: Option<String>,

    /// Cooking time in minutes
    #[arg(long)]
    pub time: Option<String>,

    /// Photo: a local file path or an http(s) URL
    #[arg(long)]
    pub image: Option<String>,
}

impl From<AddCommand> for RecipeDraft {
    fn from(cmd: AddCommand) -> Self {
        Self {
            title: cmd.title,
            category: cmd.category,
            ingredients: cmd.ingredients,
            instructions: cmd.instructions,
            temperature: cmd.temperature,
            time: cmd.time,
            image: cmd.image,
        }
    }
}

/// Remove command arguments.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Id of the record to remove
    pub id: String,

    /// Confirm the removal; without it nothing is deleted
    #[arg(short, long)]
    pub yes: bool,
}

/// Favorite commands.
#[derive(Debug, Subcommand)]
pub enum FavoriteCommand {
    /// Mark a recipe as favorite
    Add {
        /// Recipe id
        id: String,
    },

    /// List favorites
    List(ListCommand),

    /// Remove a favorite
    Remove(RemoveCommand),
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
