//! Extraction pipeline orchestration.
//!
//! Composes sources → sections → line parsing/metadata → normalization
//! into one synchronous pass per input. No state is shared across calls
//! and nothing is cached or retried here; a failed stage degrades to its
//! empty value and the pipeline keeps going.

use crate::config::ExtractionConfig;
use crate::metrics::MetricsRegistry;
use crate::model::{RawIngredient, Recipe, RecipeMetadata};
use crate::normalize::{IngredientNormalizer, TextNormalizer};
use crate::parsing::{IngredientExtractor, MetadataExtractor, SectionExtractor};
use crate::sources::ExtractorFactory;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

lazy_static! {
    static ref STEP_START: Regex = Regex::new(r"^\s*(?:\d+\s*[.)]|[•\-*])\s*").unwrap();
}

/// One-stop recipe extraction over files or raw text.
pub struct RecipeProcessor {
    factory: ExtractorFactory,
    text_normalizer: TextNormalizer,
    sections: SectionExtractor,
    ingredients: IngredientExtractor,
    metadata: MetadataExtractor,
    ingredient_normalizer: IngredientNormalizer,
    metrics: Arc<MetricsRegistry>,
}

impl RecipeProcessor {
    pub fn new(config: &ExtractionConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            factory: ExtractorFactory::new().with_ocr_language(config.ocr_language.clone()),
            text_normalizer: TextNormalizer::new(),
            sections: SectionExtractor::new(),
            ingredients: IngredientExtractor::new(),
            metadata: MetadataExtractor::new(),
            ingredient_normalizer: IngredientNormalizer::new()
                .with_max_name_len(config.max_ingredient_name_len),
            metrics,
        }
    }

    /// Processor with default settings and a private metrics registry.
    pub fn with_defaults() -> Self {
        Self::new(&ExtractionConfig::default(), Arc::new(MetricsRegistry::new()))
    }

    /// Extension registry of the underlying source factory.
    pub fn factory_mut(&mut self) -> &mut ExtractorFactory {
        &mut self.factory
    }

    /// Extracts a recipe from a file on disk.
    ///
    /// An unreadable or empty source still yields a recipe: placeholder
    /// title, no ingredients, no instructions. Per-file failures never
    /// abort a batch.
    pub fn process_file(&self, path: &Path) -> Recipe {
        self.metrics.incr("files.processed");
        let raw = self.factory.extract(path);
        if raw.trim().is_empty() {
            self.metrics.incr("files.empty_source");
            debug!("Empty extraction for {}", path.display());
            return Recipe::new(RecipeMetadata::default(), Vec::new(), Vec::new());
        }
        self.process_text(&raw)
    }

    /// Extracts a recipe from raw text.
    pub fn process_text(&self, raw: &str) -> Recipe {
        let text = self.text_normalizer.normalize(raw);
        let text = self.text_normalizer.expand_abbreviations(&text);

        let sections = self.sections.extract(&text);
        debug!(
            "Sections: {} ingredient / {} instruction / {} note lines",
            sections.ingredients.len(),
            sections.instructions.len(),
            sections.notes.len()
        );

        let parsed = self.ingredients.extract(&sections.ingredients.join("\n"));
        self.metrics.incr_by("ingredients.parsed", parsed.len() as u64);
        let raw_ingredients: Vec<RawIngredient> =
            parsed.into_iter().map(RawIngredient::from).collect();
        let ingredients = self.ingredient_normalizer.normalize(&raw_ingredients);

        let mut metadata = self.metadata.extract(&text);
        if metadata.notes.is_none() && !sections.notes.is_empty() {
            metadata.notes = Some(sections.notes.join(" "));
        }

        let instructions = assemble_steps(&sections.instructions);

        self.metrics.incr("recipes.extracted");
        info!(
            "Extracted \"{}\": {} ingredients, {} steps",
            metadata.title,
            ingredients.len(),
            instructions.len()
        );
        Recipe::new(metadata, ingredients, instructions)
    }
}

/// Merges instruction lines into one string per step. A numbered or
/// bulleted line starts a new step (marker stripped); other lines continue
/// the current step unless the previous one already ended in terminal
/// punctuation.
fn assemble_steps(lines: &[String]) -> Vec<String> {
    let mut steps: Vec<String> = Vec::new();

    for line in lines {
        if let Some(m) = STEP_START.find(line) {
            steps.push(line[m.end()..].trim().to_string());
            continue;
        }
        match steps.last_mut() {
            Some(last) if !ends_step(last) => {
                last.push(' ');
                last.push_str(line.trim());
            }
            _ => steps.push(line.trim().to_string()),
        }
    }

    steps.retain(|step| !step.is_empty());
    steps
}

fn ends_step(step: &str) -> bool {
    step.ends_with('.') || step.ends_with('!') || step.ends_with('?') || step.ends_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PLACEHOLDER_TITLE;

    fn processor() -> RecipeProcessor {
        RecipeProcessor::with_defaults()
    }

    #[test]
    fn test_full_text_extraction() {
        let text = "Título: Tortilla de patatas\nPorciones: 2\n\nIngredientes:\n4 huevos\n500 g patatas\nSal al gusto\n\nPreparación:\n1. Pelar las patatas.\n2. Batir los huevos\ny mezclar con las patatas.\n";
        let recipe = processor().process_text(text);

        assert_eq!(recipe.title, "Tortilla de patatas");
        assert_eq!(recipe.metadata.servings, Some(2));
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(
            recipe.instructions[1],
            "Batir los huevos y mezclar con las patatas."
        );
    }

    #[test]
    fn test_empty_text_degrades() {
        let recipe = processor().process_text("");
        assert_eq!(recipe.title, PLACEHOLDER_TITLE);
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_missing_file_counts_empty_source() {
        let metrics = Arc::new(MetricsRegistry::new());
        let processor = RecipeProcessor::new(&ExtractionConfig::default(), metrics.clone());
        let recipe = processor.process_file(Path::new("/no/such/recipe.txt"));
        assert_eq!(recipe.title, PLACEHOLDER_TITLE);
        assert_eq!(metrics.get("files.empty_source"), 1);
        assert_eq!(metrics.get("files.processed"), 1);
    }

    #[test]
    fn test_abbreviations_expanded_before_parsing() {
        let text = "Aliño\n\nIngredientes:\n2 cdas. de aceite\n\nPreparación:\n1. Emulsionar.";
        let recipe = processor().process_text(text);
        assert_eq!(recipe.ingredients.len(), 1);
        let oil = &recipe.ingredients[0];
        assert_eq!(oil.name, "aceite");
        assert_eq!(oil.unit, "ml");
        assert!((oil.quantity - 29.58).abs() < 0.01);
    }

    #[test]
    fn test_step_assembly_merges_soft_wraps() {
        let lines = vec![
            "1. Mezclar la harina".to_string(),
            "con el azúcar.".to_string(),
            "2. Hornear 40 minutos.".to_string(),
        ];
        let steps = assemble_steps(&lines);
        assert_eq!(steps, vec!["Mezclar la harina con el azúcar.", "Hornear 40 minutos."]);
    }
}
