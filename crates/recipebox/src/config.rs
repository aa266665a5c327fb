//! Configuration management for recipebox.
//!
//! Configuration is layered with figment: built-in defaults, then a TOML
//! file, then `RECIPEBOX_` environment variables.

use std::collections::HashSet;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::category::{CategoryFilter, ALL_LABEL, DEFAULT_CATEGORIES};
use crate::error::{Error, Result};
use crate::storage::Backend;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "recipebox";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "recipes.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `RECIPEBOX_`, sections split on `__`,
///    e.g. `RECIPEBOX_STORAGE__DATABASE_PATH`)
/// 2. TOML config file at `~/.config/recipebox/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Recipe list configuration.
    pub recipes: RecipesConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend holds the collections.
    pub backend: Backend,
    /// Path to the database file.
    /// Defaults to `~/.local/share/recipebox/recipes.db`
    pub database_path: Option<PathBuf>,
}

/// Settings for the add and list flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipesConfig {
    /// Category labels offered when adding a recipe.
    pub categories: Vec<String>,
    /// Label that means "every category" when filtering.
    pub all_label: String,
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect(),
            all_label: ALL_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults and the environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("RECIPEBOX_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let recipes = &self.recipes;

        if recipes.categories.is_empty() {
            return Err(Error::ConfigValidation {
                message: "recipes.categories must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for category in &recipes.categories {
            if category.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "recipes.categories contains a blank label".to_string(),
                });
            }
            if !seen.insert(category.as_str()) {
                return Err(Error::ConfigValidation {
                    message: format!("duplicate category: {category}"),
                });
            }
        }

        if recipes.all_label.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "recipes.all_label must not be blank".to_string(),
            });
        }

        if recipes
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&recipes.all_label))
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "all_label '{}' must not also be a category",
                    recipes.all_label
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Turn a user-selected label into a filter using the configured "all" label.
    #[must_use]
    pub fn category_filter(&self, label: Option<&str>) -> CategoryFilter {
        label.map_or(CategoryFilter::All, |label| {
            CategoryFilter::parse(label, &self.recipes.all_label)
        })
    }

    /// Check whether `category` is one of the configured labels.
    #[must_use]
    pub fn is_known_category(&self, category: &str) -> bool {
        self.recipes.categories.iter().any(|c| c == category)
    }
}
