//! Category labels and filtering.
//!
//! Filtering is pure computation over a snapshot returned by the store.

use std::fmt;

use crate::recipe::Recipe;

/// Label that selects every recipe.
pub const ALL_LABEL: &str = "All";

/// Category labels offered by the add-flow.
pub const DEFAULT_CATEGORIES: &[&str] = &["Main Course", "Dessert", "Drink", "Pastry", "Snack"];

/// Which recipes a list view should show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Show everything.
    #[default]
    All,
    /// Show only recipes whose category equals this label.
    Only(String),
}

impl CategoryFilter {
    /// Interpret a user-selected label.
    ///
    /// `all_label` (compared case-insensitively) selects everything; any other
    /// label becomes an exact-match filter.
    #[must_use]
    pub fn parse(label: &str, all_label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(all_label) {
            Self::All
        } else {
            Self::Only(label.to_string())
        }
    }

    /// Check whether a single recipe passes the filter.
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => recipe.is_in_category(category),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_LABEL}"),
            Self::Only(category) => write!(f, "{category}"),
        }
    }
}

/// Keep the recipes that pass `filter`, in their original order.
#[must_use]
pub fn filter(recipes: &[Recipe], filter: &CategoryFilter) -> Vec<Recipe> {
    recipes
        .iter()
        .filter(|recipe| filter.matches(recipe))
        .cloned()
        .collect()
}
