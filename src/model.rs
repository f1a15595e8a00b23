use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Placeholder used when no title can be extracted from the source text.
pub const PLACEHOLDER_TITLE: &str = "Receta generada";

/// Filler unit assigned to ingredients that carry no unit of their own.
pub const DEFAULT_UNIT: &str = "unidad";

/// Raw text split into the three recipe sections.
///
/// All three sections are always present; a section the source text never
/// mentions is simply empty. Lines are trimmed, non-empty and deduplicated
/// in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeSections {
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub notes: Vec<String>,
}

/// One ingredient line as parsed from an ingredients block.
///
/// `quantity` of 0.0 means the line carried no usable quantity. `unit` may
/// be empty at this stage; normalization fills it in later.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedIngredientLine {
    pub quantity: f64,
    pub unit: String,
    pub name: String,
    pub optional: bool,
}

/// Canonical ingredient entity.
///
/// `unit` is never empty: entries without one get [`DEFAULT_UNIT`].
/// Normalization, scaling and merging all produce new instances rather than
/// mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

/// Ingredient record as it arrives from callers or upstream extraction,
/// before normalization. Field aliases accept both the Spanish and English
/// key sets uniformly, so ambiguous-key payloads never travel past this
/// boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIngredient {
    #[serde(alias = "nombre", default)]
    pub name: String,
    #[serde(alias = "cantidad", default)]
    pub quantity: f64,
    #[serde(alias = "unidad", default)]
    pub unit: String,
}

impl From<ParsedIngredientLine> for RawIngredient {
    fn from(line: ParsedIngredientLine) -> Self {
        Self {
            name: line.name,
            quantity: line.quantity,
            unit: line.unit,
        }
    }
}

/// Recipe category. Unrecognized source values are coerced to `Other`
/// rather than carried through raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeType {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
    Snack,
    Drink,
    Other,
}

impl RecipeType {
    /// Maps a free-form type value (Spanish or English) to a category.
    pub fn parse(raw: &str) -> RecipeType {
        match raw.trim().to_lowercase().as_str() {
            "desayuno" | "breakfast" => RecipeType::Breakfast,
            "comida" | "almuerzo" | "lunch" => RecipeType::Lunch,
            "cena" | "dinner" => RecipeType::Dinner,
            "postre" | "dessert" => RecipeType::Dessert,
            "snack" | "aperitivo" | "merienda" => RecipeType::Snack,
            "bebida" | "drink" => RecipeType::Drink,
            _ => RecipeType::Other,
        }
    }
}

/// Difficulty rating as stated in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(raw: &str) -> Option<Difficulty> {
        match raw.trim().to_lowercase().as_str() {
            "fácil" | "facil" | "easy" | "baja" => Some(Difficulty::Easy),
            "media" | "medio" | "medium" | "normal" => Some(Difficulty::Medium),
            "difícil" | "dificil" | "hard" | "alta" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Metadata extracted from the recipe text.
///
/// Every field is always present in the extracted value; absent data is
/// `None`/empty/false, never missing. The title falls back to
/// [`PLACEHOLDER_TITLE`] and is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeMetadata {
    pub title: String,
    pub url: Option<String>,
    pub servings: Option<u32>,
    pub calories: Option<u32>,
    pub recipe_type: Option<RecipeType>,
    pub tags: BTreeSet<String>,
    pub made: bool,
    pub date: Option<NaiveDate>,
    pub difficulty: Option<Difficulty>,
    pub prep_time_min: Option<u32>,
    pub cook_time_min: Option<u32>,
    pub total_time_min: Option<u32>,
    pub notes: Option<String>,
}

impl Default for RecipeMetadata {
    fn default() -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            url: None,
            servings: None,
            calories: None,
            recipe_type: None,
            tags: BTreeSet::new(),
            made: false,
            date: None,
            difficulty: None,
            prep_time_min: None,
            cook_time_min: None,
            total_time_min: None,
            notes: None,
        }
    }
}

/// A fully assembled recipe, owned by the caller of one extraction run.
///
/// Instructions hold one string per step, with soft line-wraps already
/// merged. Tags mirror the metadata tags for convenience.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub title: String,
    pub metadata: RecipeMetadata,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub tags: BTreeSet<String>,
}

impl Recipe {
    /// Assembles a recipe from its extracted parts.
    pub fn new(
        metadata: RecipeMetadata,
        ingredients: Vec<Ingredient>,
        instructions: Vec<String>,
    ) -> Self {
        Self {
            title: metadata.title.clone(),
            tags: metadata.tags.clone(),
            metadata,
            ingredients,
            instructions,
        }
    }
}
