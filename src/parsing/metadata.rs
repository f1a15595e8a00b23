//! Metadata extraction.
//!
//! Every field runs through an ordered pattern list, Spanish patterns
//! first, English fallbacks after; the first matching pattern wins. Fields
//! that fail to parse are absent, never errors. The extracted value is
//! always complete: each field present, possibly None/empty/false.

use crate::model::{Difficulty, RecipeMetadata, RecipeType};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref SERVINGS: Vec<Regex> = compile(&[
        r"(?im)^\s*(?:porciones?|raciones?)\s*[:=]?\s*(\d+)",
        r"(?im)\bpara\s+(\d+)\s+personas\b",
        r"(?im)^\s*servings?\s*[:=]?\s*(\d+)",
        r"(?im)\bserves\s+(\d+)\b",
    ]);
    static ref CALORIES: Vec<Regex> = compile(&[
        r"(?im)^\s*calor[ií]as?\s*[:=]?\s*(\d+)",
        r"(?im)\b(\d+)\s*kcal\b",
        r"(?im)^\s*calories?\s*[:=]?\s*(\d+)",
    ]);
    static ref RECIPE_TYPE: Vec<Regex> = compile(&[
        r"(?im)^\s*tipo\s*[:=]\s*(\S.*)$",
        r"(?im)^\s*(?:type|category)\s*[:=]\s*(\S.*)$",
    ]);
    static ref TAGS: Vec<Regex> = compile(&[
        r"(?im)^\s*etiquetas?\s*[:=]\s*(\S.*)$",
        r"(?im)^\s*tags?\s*[:=]\s*(\S.*)$",
    ]);
    static ref MADE: Vec<Regex> = compile(&[
        r"(?im)^\s*hecho\s*[:=]?\s*(?:s[ií]|yes|true|x|1)\b",
        r"(?im)^\s*(?:estado|status)\s*[:=]\s*(?:hecho|completad[oa]|done|completed)\b",
        r"(?im)[✓✔]\s*(?:hecho|completado)",
    ]);
    static ref DATE: Vec<Regex> = compile(&[
        r"(?im)^\s*fecha\s*[:=]\s*(\d{4}-\d{2}-\d{2})",
        r"(?im)^\s*fecha\s*[:=]\s*(\d{1,2}/\d{1,2}/\d{4})",
        r"(?im)^\s*date\s*[:=]\s*(\d{4}-\d{2}-\d{2})",
        r"\b(\d{2}/\d{2}/\d{4})\b",
    ]);
    static ref DIFFICULTY: Vec<Regex> = compile(&[
        r"(?im)^\s*dificultad\s*[:=]\s*(\w+)",
        r"(?im)^\s*difficulty\s*[:=]\s*(\w+)",
    ]);
    static ref PREP_TIME: Vec<Regex> = compile(&[
        r"(?im)tiempo\s+de\s+preparaci[oó]n\s*[:=]?\s*(\d+)",
        r"(?im)^\s*preparaci[oó]n\s*[:=]\s*(\d+)\s*(?:min|minutos)?",
        r"(?im)prep(?:aration)?\s*time\s*[:=]?\s*(\d+)",
    ]);
    static ref COOK_TIME: Vec<Regex> = compile(&[
        r"(?im)tiempo\s+de\s+cocci[oó]n\s*[:=]?\s*(\d+)",
        r"(?im)^\s*cocci[oó]n\s*[:=]\s*(\d+)\s*(?:min|minutos)?",
        r"(?im)cook(?:ing)?\s*time\s*[:=]?\s*(\d+)",
    ]);
    static ref TOTAL_TIME: Vec<Regex> = compile(&[
        r"(?im)tiempo\s+total\s*[:=]?\s*(\d+)",
        r"(?im)total\s*time\s*[:=]?\s*(\d+)",
    ]);
    static ref NOTES: Vec<Regex> = compile(&[
        r"(?im)^\s*notas?\s*[:=]\s*(\S.*)$",
        r"(?im)^\s*notes?\s*[:=]\s*(\S.*)$",
    ]);
    static ref URL: Vec<Regex> = compile(&[r"(https?://\S+)"]);

    static ref TITLE_PREFIX: Regex = Regex::new(r"(?i)^\s*t[ií]tulo\s*:\s*").unwrap();
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Walks an ordered pattern list, returning the first capture that hits.
fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

fn first_number(patterns: &[Regex], text: &str) -> Option<u32> {
    first_capture(patterns, text).and_then(|raw| raw.parse().ok())
}

/// Extracts recipe metadata from raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Runs all field pattern lists over the text and validates the result.
    /// Never fails; empty input yields the defaults (placeholder title,
    /// everything else absent/false).
    pub fn extract(&self, text: &str) -> RecipeMetadata {
        let raw = RecipeMetadata {
            title: extract_title(text),
            url: first_capture(&URL, text),
            servings: first_number(&SERVINGS, text),
            calories: first_number(&CALORIES, text),
            recipe_type: first_capture(&RECIPE_TYPE, text)
                .map(|value| RecipeType::parse(&value)),
            tags: extract_tags(text),
            made: MADE.iter().any(|pattern| pattern.is_match(text)),
            date: extract_date(text),
            difficulty: first_capture(&DIFFICULTY, text)
                .and_then(|value| Difficulty::parse(&value)),
            prep_time_min: first_number(&PREP_TIME, text),
            cook_time_min: first_number(&COOK_TIME, text),
            total_time_min: first_number(&TOTAL_TIME, text),
            notes: first_capture(&NOTES, text),
        };
        validate(raw)
    }
}

/// First non-empty line, stripping a "Título:" prefix; the fixed
/// placeholder when no line qualifies.
fn extract_title(text: &str) -> String {
    let candidate = text
        .lines()
        .map(|line| TITLE_PREFIX.replace(line, "").trim().to_string())
        .find(|line| !line.is_empty());

    match candidate {
        Some(title) => title,
        None => {
            debug!("No usable title line found, using placeholder");
            crate::model::PLACEHOLDER_TITLE.to_string()
        }
    }
}

/// Comma-separated tag list, lowercased and set-deduplicated.
fn extract_tags(text: &str) -> BTreeSet<String> {
    first_capture(&TAGS, text)
        .map(|raw| {
            raw.split(',')
                .map(|tag| tag.trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// ISO dates pass straight through; DD/MM/YYYY is rewritten to ISO.
/// Calendar-invalid dates are treated as absent.
fn extract_date(text: &str) -> Option<NaiveDate> {
    let raw = first_capture(&DATE, text)?;
    if raw.contains('/') {
        NaiveDate::parse_from_str(&raw, "%d/%m/%Y").ok()
    } else {
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()
    }
}

/// Post-extraction validation: non-positive counts become absent and the
/// total time backfills from prep + cook when missing.
fn validate(mut meta: RecipeMetadata) -> RecipeMetadata {
    if meta.servings == Some(0) {
        meta.servings = None;
    }
    if meta.calories == Some(0) {
        meta.calories = None;
    }
    if meta.total_time_min.is_none() {
        let prep = meta.prep_time_min.unwrap_or(0);
        let cook = meta.cook_time_min.unwrap_or(0);
        if prep + cook > 0 {
            meta.total_time_min = Some(prep + cook);
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PLACEHOLDER_TITLE;

    #[test]
    fn test_empty_text_yields_defaults() {
        let meta = MetadataExtractor::new().extract("");
        assert_eq!(meta.title, PLACEHOLDER_TITLE);
        assert_eq!(meta.servings, None);
        assert_eq!(meta.calories, None);
        assert_eq!(meta.recipe_type, None);
        assert!(meta.tags.is_empty());
        assert!(!meta.made);
        assert_eq!(meta.date, None);
        assert_eq!(meta.total_time_min, None);
        assert_eq!(meta.notes, None);
    }

    #[test]
    fn test_title_from_first_lines() {
        let meta = MetadataExtractor::new().extract("\n\nTítulo: Tarta de manzana\nmás texto");
        assert_eq!(meta.title, "Tarta de manzana");
    }

    #[test]
    fn test_title_scans_past_five_empty_lines() {
        let meta = MetadataExtractor::new().extract("\n\n\n\n\n\nPaella");
        assert_eq!(meta.title, "Paella");
    }

    #[test]
    fn test_spanish_patterns_win_over_english() {
        let text = "Porciones: 4\nServings: 8";
        let meta = MetadataExtractor::new().extract(text);
        assert_eq!(meta.servings, Some(4));
    }

    #[test]
    fn test_zero_servings_treated_as_absent() {
        let meta = MetadataExtractor::new().extract("Porciones: 0\nCalorías: 0");
        assert_eq!(meta.servings, None);
        assert_eq!(meta.calories, None);
    }

    #[test]
    fn test_tags_lowercased_and_deduplicated() {
        let meta = MetadataExtractor::new().extract("Etiquetas: Postre, Fácil, postre");
        let tags: Vec<&str> = meta.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["fácil", "postre"]);
    }

    #[test]
    fn test_made_sentinels() {
        let extractor = MetadataExtractor::new();
        assert!(extractor.extract("Hecho: sí").made);
        assert!(extractor.extract("Estado: completado").made);
        assert!(extractor.extract("✓ Hecho").made);
        assert!(!extractor.extract("Hecho: no").made);
    }

    #[test]
    fn test_date_formats() {
        let extractor = MetadataExtractor::new();
        let meta = extractor.extract("Fecha: 2024-03-15");
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        let meta = extractor.extract("Fecha: 15/03/2024");
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_total_time_backfills_from_prep_and_cook() {
        let text = "Tiempo de preparación: 15\nTiempo de cocción: 30";
        let meta = MetadataExtractor::new().extract(text);
        assert_eq!(meta.total_time_min, Some(45));
    }

    #[test]
    fn test_explicit_total_time_wins() {
        let text = "Tiempo de preparación: 15\nTiempo total: 50";
        let meta = MetadataExtractor::new().extract(text);
        assert_eq!(meta.total_time_min, Some(50));
    }

    #[test]
    fn test_unknown_tipo_coerced_to_other() {
        let meta = MetadataExtractor::new().extract("Tipo: fusión experimental");
        assert_eq!(meta.recipe_type, Some(RecipeType::Other));
        let meta = MetadataExtractor::new().extract("Tipo: postre");
        assert_eq!(meta.recipe_type, Some(RecipeType::Dessert));
    }

    #[test]
    fn test_difficulty_and_notes() {
        let meta = MetadataExtractor::new().extract("Dificultad: fácil\nNotas: sale mejor reposada");
        assert_eq!(meta.difficulty, Some(Difficulty::Easy));
        assert_eq!(meta.notes.as_deref(), Some("sale mejor reposada"));
    }
}
