//! Store operations behind the mutating CLI commands.
//!
//! These return what happened instead of printing it, so the binary decides
//! how to report and the checks run before the store is touched.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::recipe::{new_recipe_id, Recipe, RecipeDraft};
use crate::store::{Collection, RecipeStore};

use super::RemoveCommand;

/// Result of a remove request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// No entry has the requested id.
    NotFound,
    /// The entry exists but removal was not confirmed. Nothing was written.
    Unconfirmed(Recipe),
    /// The entry was removed.
    Removed(Recipe),
}

/// Result of marking a recipe as favorite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteOutcome {
    /// No recipe has the requested id.
    NotFound,
    /// The recipe was copied into favorites.
    Added(Recipe),
    /// The recipe was already a favorite.
    AlreadyFavorite(Recipe),
}

/// Validate `draft` against the configured categories and append it to recipes.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an incomplete draft or an unknown
/// category, in which case the store is not called. Store errors are
/// passed through.
pub async fn add_recipe(
    config: &Config,
    store: &RecipeStore,
    draft: RecipeDraft,
) -> Result<Recipe> {
    draft.validate()?;
    if !config.is_known_category(draft.category.trim()) {
        return Err(Error::validation(
            "category",
            format!(
                "'{}' is not one of: {}",
                draft.category,
                config.recipes.categories.join(", ")
            ),
        ));
    }

    let recipe = draft.into_recipe(new_recipe_id())?;
    store.append(Collection::Recipes, recipe.clone()).await?;
    Ok(recipe)
}

/// Remove the entry named by `cmd` from `collection`, only when confirmed.
///
/// # Errors
///
/// Returns an error if the collection cannot be read or written.
pub async fn remove_entry(
    store: &RecipeStore,
    collection: Collection,
    cmd: &RemoveCommand,
) -> Result<RemoveOutcome> {
    let Some(recipe) = store.find(collection, &cmd.id).await? else {
        return Ok(RemoveOutcome::NotFound);
    };

    if !cmd.yes {
        return Ok(RemoveOutcome::Unconfirmed(recipe));
    }

    store.remove(collection, &cmd.id).await?;
    Ok(RemoveOutcome::Removed(recipe))
}

/// Copy the recipe with `id` into favorites.
///
/// # Errors
///
/// Returns an error if either collection cannot be read or written.
pub async fn favorite_recipe(store: &RecipeStore, id: &str) -> Result<FavoriteOutcome> {
    let Some(recipe) = store.find(Collection::Recipes, id).await? else {
        return Ok(FavoriteOutcome::NotFound);
    };

    if store.add_favorite(recipe.clone()).await? {
        Ok(FavoriteOutcome::Added(recipe))
    } else {
        Ok(FavoriteOutcome::AlreadyFavorite(recipe))
    }
}
