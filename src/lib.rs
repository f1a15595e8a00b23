//! Normalizes loosely-structured recipe text into structured records.
//!
//! The pipeline reads a file (plain text, PDF or scanned image), splits it
//! into ingredient/instruction/note sections, parses ingredient lines and
//! metadata, and assembles a [`Recipe`] ready for the knowledge-base
//! storage boundary.

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod parsing;
pub mod pipeline;
pub mod sources;
pub mod storage;

pub use config::AppConfig;
pub use error::ExtractError;
pub use model::{Ingredient, ParsedIngredientLine, Recipe, RecipeMetadata, RecipeSections};
pub use pipeline::RecipeProcessor;

use std::path::Path;

/// Extracts a recipe from a file, with default settings.
///
/// Unreadable or empty sources degrade to a placeholder recipe rather than
/// failing; use [`RecipeProcessor`] directly for configured runs.
pub fn extract_recipe_from_file(path: impl AsRef<Path>) -> Recipe {
    RecipeProcessor::with_defaults().process_file(path.as_ref())
}

/// Extracts a recipe from raw text, with default settings.
pub fn extract_recipe_from_text(text: &str) -> Recipe {
    RecipeProcessor::with_defaults().process_text(text)
}
