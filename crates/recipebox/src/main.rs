//! `recipebox` - CLI for the recipe store
//!
//! Lists, shows, adds and removes recipes and favorites kept in local
//! storage.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use recipebox::category;
use recipebox::cli::{
    add_recipe, favorite_recipe, remove_entry, AddCommand, Cli, Command, ConfigCommand,
    FavoriteCommand, FavoriteOutcome, ListCommand, OutputFormat, RemoveCommand, RemoveOutcome,
    ShowCommand,
};
use recipebox::storage::open_backend;
use recipebox::{init_logging, Collection, Config, Recipe, RecipeDraft, RecipeStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Config commands load (or diagnose) the configuration themselves
    let command = match cli.command {
        Command::Config(cmd) => return handle_config(cli.config, cmd),
        command => command,
    };

    let config = Config::load_from(cli.config).context("loading configuration")?;

    let result = match open_backend(&config) {
        Ok(backend) => run(&config, RecipeStore::new(backend), command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("{}", e.user_notice());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(config: &Config, store: RecipeStore, command: Command) -> recipebox::Result<()> {
    match command {
        Command::List(cmd) => handle_list(config, &store, Collection::Recipes, &cmd).await,
        Command::Show(cmd) => handle_show(&store, &cmd).await,
        Command::Add(cmd) => handle_add(config, &store, cmd).await,
        Command::Remove(cmd) => handle_remove(&store, Collection::Recipes, &cmd).await,
        Command::Favorite(cmd) => handle_favorite(config, &store, cmd).await,
        Command::Categories => {
            for label in &config.recipes.categories {
                println!("{label}");
            }
            Ok(())
        }
        Command::Config(_) => Ok(()),
    }
}

async fn handle_list(
    config: &Config,
    store: &RecipeStore,
    collection: Collection,
    cmd: &ListCommand,
) -> recipebox::Result<()> {
    let filter = config.category_filter(cmd.category.as_deref());
    let snapshot = store.load_all(collection).await?;
    let recipes = category::filter(&snapshot, &filter);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipes)?),
        OutputFormat::Plain => {
            for recipe in &recipes {
                println!("{}\t{}\t{}", recipe.id, recipe.title, recipe.category);
            }
        }
        OutputFormat::Table => print_table(collection, &filter.to_string(), &recipes),
    }
    Ok(())
}

fn print_table(collection: Collection, filter: &str, recipes: &[Recipe]) {
    if recipes.is_empty() {
        println!("No {collection} in '{filter}'.");
        return;
    }

    let id_width = recipes.iter().map(|r| r.id.len()).max().unwrap_or(2).max(2);
    let title_width = recipes
        .iter()
        .map(|r| r.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    println!("{:<id_width$}  {:<title_width$}  CATEGORY", "ID", "TITLE");
    for recipe in recipes {
        println!(
            "{:<id_width$}  {:<title_width$}  {}",
            recipe.id, recipe.title, recipe.category
        );
    }
}

async fn handle_show(store: &RecipeStore, cmd: &ShowCommand) -> recipebox::Result<()> {
    let collection = if cmd.favorite {
        Collection::Favorites
    } else {
        Collection::Recipes
    };

    let Some(recipe) = store.find(collection, &cmd.id).await? else {
        println!("No entry with id {} in {collection}.", cmd.id);
        return Ok(());
    };

    if cmd.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    let favorite = store.contains(Collection::Favorites, &recipe.id).await?;
    println!("{}{}", recipe.title, if favorite { "  ★" } else { "" });
    println!("{}", "=".repeat(recipe.title.chars().count().max(1)));
    println!("Category:     {}", recipe.category);
    if let Some(temperature) = &recipe.temperature {
        println!("Temperature:  {temperature} °C");
    }
    if let Some(time) = &recipe.time {
        println!("Time:         {time} min");
    }
    match recipe.image.as_reference() {
        Some(reference) => println!("Photo:        {reference}"),
        None => println!("Photo:        (none)"),
    }
    println!();
    println!("Ingredients");
    for line in recipe.ingredient_lines() {
        println!("  - {line}");
    }
    println!();
    println!("Instructions");
    println!("{}", recipe.instructions);
    Ok(())
}

async fn handle_add(config: &Config, store: &RecipeStore, cmd: AddCommand) -> recipebox::Result<()> {
    let recipe = add_recipe(config, store, RecipeDraft::from(cmd)).await?;
    println!("Recipe added ({}).", recipe.id);
    Ok(())
}

async fn handle_remove(
    store: &RecipeStore,
    collection: Collection,
    cmd: &RemoveCommand,
) -> recipebox::Result<()> {
    match remove_entry(store, collection, cmd).await? {
        RemoveOutcome::NotFound => println!("No entry with id {} in {collection}.", cmd.id),
        RemoveOutcome::Unconfirmed(recipe) => println!(
            "Remove '{}' ({}) from {collection}? Re-run with --yes to confirm.",
            recipe.title, recipe.id
        ),
        RemoveOutcome::Removed(recipe) => {
            println!("Removed '{}' from {collection}.", recipe.title);
        }
    }
    Ok(())
}

async fn handle_favorite(
    config: &Config,
    store: &RecipeStore,
    cmd: FavoriteCommand,
) -> recipebox::Result<()> {
    match cmd {
        FavoriteCommand::Add { id } => {
            match favorite_recipe(store, &id).await? {
                FavoriteOutcome::NotFound => println!("No recipe with id {id}."),
                FavoriteOutcome::Added(recipe) => {
                    println!("Added '{}' to favorites.", recipe.title);
                }
                FavoriteOutcome::AlreadyFavorite(recipe) => {
                    println!("'{}' is already a favorite.", recipe.title);
                }
            }
            Ok(())
        }
        FavoriteCommand::List(list) => {
            handle_list(config, store, Collection::Favorites, &list).await
        }
        FavoriteCommand::Remove(remove) => {
            handle_remove(store, Collection::Favorites, &remove).await
        }
    }
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("loading configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Recipes]");
                println!("  Categories:         {}", config.recipes.categories.join(", "));
                println!("  All label:          {}", config.recipes.all_label);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
