//! Raw text canonicalization.
//!
//! Cleans up whitespace and unicode noise coming out of OCR and copy-pasted
//! sources before the structural parsers see the text. Accent folding keeps
//! `ñ` intact since it is meaning-bearing in Spanish ingredient names.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref SPACE_RUN: Regex = Regex::new(r"[ \t\x0b\x0c]+").unwrap();
    static ref BLANK_RUN: Regex = Regex::new(r"\n{3,}").unwrap();

    /// Abbreviations expanded during normalization. Kept to measurement
    /// shorthand; anything ambiguous stays untouched.
    static ref ABBREVIATIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("cda", "cucharada");
        m.insert("cdas", "cucharadas");
        m.insert("cdta", "cucharadita");
        m.insert("cdtas", "cucharaditas");
        m.insert("tbsp", "tablespoon");
        m.insert("tsp", "teaspoon");
        m.insert("min", "minutos");
        m.insert("aprox", "aproximadamente");
        m
    };

    /// Cooking terms that must survive normalization verbatim; abbreviation
    /// expansion skips any line containing one.
    static ref PROTECTED_TERMS: Vec<&'static str> = vec![
        "al dente",
        "baño maría",
        "bano maria",
        "mise en place",
        "sofrito",
        "a fuego lento",
        "al gusto",
    ];
}

/// Canonicalizes raw recipe text: whitespace, accents, abbreviations.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Full cleanup pass applied before section extraction: per-line
    /// whitespace collapse plus blank-line deduplication. Accent folding is
    /// not applied here; it would corrupt ingredient names.
    pub fn normalize(&self, text: &str) -> String {
        let collapsed: Vec<String> = text
            .lines()
            .map(|line| SPACE_RUN.replace_all(line.trim(), " ").into_owned())
            .collect();
        let joined = collapsed.join("\n");
        BLANK_RUN.replace_all(&joined, "\n\n").into_owned()
    }

    /// Folds accented vowels to their plain forms, preserving `ñ`/`Ñ`.
    /// Caller-facing utility for accent-insensitive matching; the pipeline
    /// keeps accents in stored names and matches them explicitly instead.
    pub fn strip_accents(&self, text: &str) -> String {
        text.chars()
            .map(|c| match c {
                'á' | 'à' | 'ä' | 'â' => 'a',
                'é' | 'è' | 'ë' | 'ê' => 'e',
                'í' | 'ì' | 'ï' | 'î' => 'i',
                'ó' | 'ò' | 'ö' | 'ô' => 'o',
                'ú' | 'ù' | 'ü' | 'û' => 'u',
                'Á' | 'À' | 'Ä' | 'Â' => 'A',
                'É' | 'È' | 'Ë' | 'Ê' => 'E',
                'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
                'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
                'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
                other => other,
            })
            .collect()
    }

    /// Expands measurement abbreviations word by word. Lines containing a
    /// protected cooking term are left verbatim.
    pub fn expand_abbreviations(&self, text: &str) -> String {
        text.lines()
            .map(|line| {
                let lower = line.to_lowercase();
                if PROTECTED_TERMS.iter().any(|term| lower.contains(term)) {
                    return line.to_string();
                }
                line.split(' ')
                    .map(expand_word)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn expand_word(word: &str) -> String {
    let bare = word.trim_end_matches('.');
    match ABBREVIATIONS.get(bare.to_lowercase().as_str()) {
        Some(full) => (*full).to_string(),
        None => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_collapse() {
        let normalizer = TextNormalizer::new();
        let out = normalizer.normalize("  hola \t mundo  \n\n\n\n línea ");
        assert_eq!(out, "hola mundo\n\nlínea");
    }

    #[test]
    fn test_accent_folding_keeps_enie() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.strip_accents("Azúcar y cigüeña"), "Azucar y cigueña");
    }

    #[test]
    fn test_abbreviation_expansion() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.expand_abbreviations("2 cdas. de aceite"),
            "2 cucharadas de aceite"
        );
    }

    #[test]
    fn test_protected_terms_untouched() {
        let normalizer = TextNormalizer::new();
        let line = "cocer la pasta al dente, 10 min";
        assert_eq!(normalizer.expand_abbreviations(line), line);
    }
}
