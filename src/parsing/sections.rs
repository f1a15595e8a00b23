//! Section segmentation.
//!
//! Splits raw recipe text into ingredients/instructions/notes line groups.
//! Recognized headers switch the current section; when a text carries no
//! headers at all, a single-pass heuristic assigns lines instead.

use crate::model::RecipeSections;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    // Headers tolerate leading/trailing marker characters: "-- Ingredientes --"
    static ref INGREDIENTS_HEADER: Regex = Regex::new(
        r"(?i)^[\s\-*=#:·]*ingredient(?:es|s)?[\s\-*=#:·]*$"
    ).unwrap();
    static ref INSTRUCTIONS_HEADER: Regex = Regex::new(
        r"(?i)^[\s\-*=#:·]*(?:instrucciones|preparaci[oó]n|elaboraci[oó]n|pasos|instructions|directions|method|steps)[\s\-*=#:·]*$"
    ).unwrap();
    static ref NOTES_HEADER: Regex = Regex::new(
        r"(?i)^[\s\-*=#:·]*(?:notas?|notes?|consejos|tips)[\s\-*=#:·]*$"
    ).unwrap();

    // Heuristic fallback markers for header-less texts
    static ref STEP_LINE: Regex = Regex::new(r"^\s*(?:\d+\s*[.)]|[•\-*])\s+").unwrap();
    static ref NOTE_PREFIX: Regex = Regex::new(r"(?i)^\s*(?:nota|note|tip|consejo)\b").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Ingredients,
    Instructions,
    Notes,
}

/// Splits raw text into the three recipe sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionExtractor;

impl SectionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the ingredients/instructions/notes sections.
    ///
    /// All three sections are always present in the result, possibly empty.
    /// Header lines never appear as content. Empty lines are dropped and
    /// duplicates removed in first-seen order.
    pub fn extract(&self, text: &str) -> RecipeSections {
        let sections = if has_any_header(text) {
            self.extract_by_headers(text)
        } else {
            debug!("No section headers recognized, using positional heuristic");
            self.extract_heuristic(text)
        };

        RecipeSections {
            ingredients: clean_lines(sections.ingredients),
            instructions: clean_lines(sections.instructions),
            notes: clean_lines(sections.notes),
        }
    }

    fn extract_by_headers(&self, text: &str) -> RecipeSections {
        let mut out = RecipeSections::default();
        let mut current: Option<Section> = None;

        for line in text.lines() {
            if let Some(section) = match_header(line) {
                current = Some(section);
                continue;
            }
            // A line matching any header pattern never lands as content
            let Some(section) = current else { continue };
            push_line(&mut out, section, line);
        }
        out
    }

    /// Header-less fallback: start in ingredients, switch to instructions
    /// at the first numbered/bulleted line, to notes at a note prefix.
    fn extract_heuristic(&self, text: &str) -> RecipeSections {
        let mut out = RecipeSections::default();
        let mut current = Section::Ingredients;

        for line in text.lines() {
            if NOTE_PREFIX.is_match(line) {
                current = Section::Notes;
            } else if current == Section::Ingredients && STEP_LINE.is_match(line) {
                current = Section::Instructions;
            }
            push_line(&mut out, current, line);
        }
        out
    }
}

fn match_header(line: &str) -> Option<Section> {
    if INGREDIENTS_HEADER.is_match(line) {
        Some(Section::Ingredients)
    } else if INSTRUCTIONS_HEADER.is_match(line) {
        Some(Section::Instructions)
    } else if NOTES_HEADER.is_match(line) {
        Some(Section::Notes)
    } else {
        None
    }
}

fn has_any_header(text: &str) -> bool {
    text.lines().any(|line| match_header(line).is_some())
}

fn push_line(out: &mut RecipeSections, section: Section, line: &str) {
    let target = match section {
        Section::Ingredients => &mut out.ingredients,
        Section::Instructions => &mut out.instructions,
        Section::Notes => &mut out.notes,
    };
    target.push(line.to_string());
}

/// Trims, drops empties, deduplicates preserving first-seen order.
fn clean_lines(lines: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_three_empty_sections() {
        let sections = SectionExtractor::new().extract("");
        assert_eq!(sections, RecipeSections::default());
    }

    #[test]
    fn test_header_driven_split() {
        let text = "Ingredientes:\n200 g harina\n2 huevos\n\nPreparación:\nMezclar todo\nHornear\n\nNotas:\nMejor en frío";
        let sections = SectionExtractor::new().extract(text);
        assert_eq!(sections.ingredients, vec!["200 g harina", "2 huevos"]);
        assert_eq!(sections.instructions, vec!["Mezclar todo", "Hornear"]);
        assert_eq!(sections.notes, vec!["Mejor en frío"]);
    }

    #[test]
    fn test_decorated_headers_recognized() {
        let text = "-- INGREDIENTS --\nflour\n=== Steps ===\nmix";
        let sections = SectionExtractor::new().extract(text);
        assert_eq!(sections.ingredients, vec!["flour"]);
        assert_eq!(sections.instructions, vec!["mix"]);
    }

    #[test]
    fn test_header_lines_never_in_content() {
        let text = "Ingredientes\nsal\nIngredientes\npimienta";
        let sections = SectionExtractor::new().extract(text);
        assert_eq!(sections.ingredients, vec!["sal", "pimienta"]);
    }

    #[test]
    fn test_content_before_first_header_dropped() {
        let text = "Mi receta favorita\nIngredientes:\nsal";
        let sections = SectionExtractor::new().extract(text);
        assert_eq!(sections.ingredients, vec!["sal"]);
        assert!(sections.instructions.is_empty());
    }

    #[test]
    fn test_heuristic_fallback_without_headers() {
        let text = "200 g harina\n2 huevos\n1. Mezclar la harina\n2. Añadir los huevos\nNota: servir frío";
        let sections = SectionExtractor::new().extract(text);
        assert_eq!(sections.ingredients, vec!["200 g harina", "2 huevos"]);
        assert_eq!(
            sections.instructions,
            vec!["1. Mezclar la harina", "2. Añadir los huevos"]
        );
        assert_eq!(sections.notes, vec!["Nota: servir frío"]);
    }

    #[test]
    fn test_duplicate_lines_deduplicated() {
        let text = "Ingredientes:\nsal\nsal\npimienta\nsal";
        let sections = SectionExtractor::new().extract(text);
        assert_eq!(sections.ingredients, vec!["sal", "pimienta"]);
    }
}
