//! Command-line interface for recipebox.
//!
//! This module provides the CLI structure for the `recipebox` binary.

mod actions;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use actions::{add_recipe, favorite_recipe, remove_entry, FavoriteOutcome, RemoveOutcome};
pub use commands::{
    AddCommand, ConfigCommand, FavoriteCommand, ListCommand, OutputFormat, RemoveCommand,
    ShowCommand,
};

/// recipebox - keep your recipes and favorites on this machine
#[derive(Debug, Parser)]
#[command(name = "recipebox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List recipes, optionally filtered by category
    List(ListCommand),

    /// Show one recipe in detail
    Show(ShowCommand),

    /// Add a new recipe
    Add(AddCommand),

    /// Delete a recipe
    Remove(RemoveCommand),

    /// Manage favorites
    #[command(subcommand)]
    Favorite(FavoriteCommand),

    /// List the known categories
    Categories,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
