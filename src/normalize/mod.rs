pub mod ingredient;
pub mod measurement;
pub mod text;

pub use ingredient::IngredientNormalizer;
pub use measurement::MeasurementNormalizer;
pub use text::TextNormalizer;
