pub mod ingredients;
pub mod metadata;
pub mod sections;

pub use ingredients::IngredientExtractor;
pub use metadata::MetadataExtractor;
pub use sections::SectionExtractor;
