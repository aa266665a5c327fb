//! `recipebox` - local recipe keeping
//!
//! This library stores user-authored recipes and a separate list of
//! favorites in local key-value storage, and provides the category filtering
//! the list views need.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod recipe;
pub mod storage;
pub mod store;

pub use category::CategoryFilter;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use recipe::{new_recipe_id, FavoriteEntry, Recipe, RecipeDraft, RecipeImage};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use store::{Collection, RecipeStore};
