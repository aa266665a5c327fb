//! Recipe records and the add-flow draft.
//!
//! A [`Recipe`] is immutable once created; the only lifecycle events are
//! creation (through a validated [`RecipeDraft`]) and deletion from the store.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Last id handed out by [`new_recipe_id`], in milliseconds since the epoch.
static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a fresh recipe id.
///
/// Ids are derived from the wall clock in milliseconds and are strictly
/// increasing within the process: two calls in the same millisecond (or a
/// clock step backwards) yield `last + 1` instead of a repeat.
#[must_use]
pub fn new_recipe_id() -> String {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1).to_string()
}

/// Photo attached to a recipe.
///
/// Written as an optional string: URLs with an `http`/`https` scheme are
/// remote, anything else is a file on the device. Older records may hold an
/// asset object such as `{"uri": "file:///..."}`; its `uri` is read like a
/// bare string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<StoredImage>", into = "Option<String>")]
pub enum RecipeImage {
    /// A file reference on the local device.
    LocalAsset(String),
    /// An absolute `http(s)` URL.
    RemoteUrl(String),
    /// No photo.
    #[default]
    None,
}

impl RecipeImage {
    /// Classify a raw image reference.
    ///
    /// The reference is kept verbatim; surrounding whitespace only matters
    /// for deciding whether it is blank or remote.
    #[must_use]
    pub fn from_reference(reference: &str) -> Self {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            Self::None
        } else if is_remote(trimmed) {
            Self::RemoteUrl(reference.to_string())
        } else {
            Self::LocalAsset(reference.to_string())
        }
    }

    /// The stored reference, if there is one.
    #[must_use]
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Self::LocalAsset(s) | Self::RemoteUrl(s) => Some(s),
            Self::None => None,
        }
    }

    /// Check if a photo is attached.
    #[must_use]
    pub fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

fn is_remote(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl From<Option<String>> for RecipeImage {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map_or(Self::None, Self::from_reference)
    }
}

/// Shapes an `image` field can take in stored data.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredImage {
    Reference(String),
    Asset { uri: String },
}

impl From<Option<StoredImage>> for RecipeImage {
    fn from(value: Option<StoredImage>) -> Self {
        match value {
            Some(StoredImage::Reference(reference) | StoredImage::Asset { uri: reference }) => {
                Self::from_reference(&reference)
            }
            None => Self::None,
        }
    }
}

impl From<RecipeImage> for Option<String> {
    fn from(value: RecipeImage) -> Self {
        match value {
            RecipeImage::LocalAsset(s) | RecipeImage::RemoteUrl(s) => Some(s),
            RecipeImage::None => None,
        }
    }
}

/// A user-authored cooking record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique, timestamp-derived id. Never reused.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Category label, normally one of the configured categories.
    pub category: String,

    /// Newline-separated ingredient list.
    #[serde(default)]
    pub ingredients: String,

    /// Preparation steps.
    #[serde(default)]
    pub instructions: String,

    /// Cooking temperature in °C, as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,

    /// Cooking time in minutes, as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Optional photo.
    #[serde(default)]
    pub image: RecipeImage,
}

/// Favorites share the recipe shape but live in their own collection.
pub type FavoriteEntry = Recipe;

impl Recipe {
    /// Ingredient lines with surrounding whitespace removed; blank lines skipped.
    pub fn ingredient_lines(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    /// Check whether this recipe belongs to `category` (exact match).
    #[must_use]
    pub fn is_in_category(&self, category: &str) -> bool {
        self.category == category
    }
}

/// Raw input collected by the add-flow before a recipe exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Recipe title.
    pub title: String,
    /// Selected category label.
    pub category: String,
    /// Ingredients, one per line.
    pub ingredients: String,
    /// Preparation steps.
    pub instructions: String,
    /// Optional temperature, must be numeric when given.
    pub temperature: Option<String>,
    /// Optional duration, must be numeric when given.
    pub time: Option<String>,
    /// Optional photo reference from the picker.
    pub image: Option<String>,
}

impl RecipeDraft {
    /// Check that every required field is present and numeric fields parse.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("title", &self.title),
            ("category", &self.category),
            ("ingredients", &self.ingredients),
            ("instructions", &self.instructions),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::validation(field, "is required"));
            }
        }

        validate_numeric("temperature", self.temperature.as_deref())?;
        validate_numeric("time", self.time.as_deref())?;
        Ok(())
    }

    /// Validate the draft and turn it into a recipe with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the draft is incomplete.
    pub fn into_recipe(self, id: impl Into<String>) -> Result<Recipe> {
        self.validate()?;
        Ok(Recipe {
            id: id.into(),
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            ingredients: self.ingredients,
            instructions: self.instructions,
            temperature: non_blank(self.temperature),
            time: non_blank(self.time),
            image: RecipeImage::from(self.image),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_numeric(field: &'static str, value: Option<&str>) -> Result<()> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(()),
        _ => Err(Error::validation(
            field,
            format!("'{value}' is not a non-negative number"),
        )),
    }
}
