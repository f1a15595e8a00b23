//! Ingredient line parsing.
//!
//! Turns the lines of an ingredients block into structured entries. Input
//! here is whatever survives OCR and copy-paste: bullets, unicode fraction
//! glyphs, ranges, "opcional" markers, conjoined names. The parser is
//! total; a line it cannot understand still yields a best-effort entry.
//!
//! Range policy: this parser keeps the FIRST value of "2-3" style ranges.
//! The standalone measurement normalizer averages them instead. The two
//! behaviors are divergent on purpose; see DESIGN.md.

use crate::model::{ParsedIngredientLine, DEFAULT_UNIT};
use crate::normalize::measurement;
use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

lazy_static! {
    static ref BULLET: Regex = Regex::new(r"^[\s•\-*·–—]+").unwrap();
    static ref STEP_MARKER: Regex =
        Regex::new(r"(?i)^\s*(?:paso|step|instrucci[oó]n)\b|^\s*\d+\s*[.)]\s").unwrap();
    static ref PARENTHETICAL: Regex = Regex::new(r"\s*\([^)]*\)").unwrap();
    static ref OPTIONAL_MARKER: Regex =
        Regex::new(r"(?i)^\s*\(?\s*(?:opcional|optional)\s*\)?\s*[:,]?\s*").unwrap();
    static ref OPTIONAL_PAREN: Regex = Regex::new(r"(?i)\(\s*(?:opcional|optional)\s*\)").unwrap();

    // Quantity tokens, leading position only
    static ref QTY_MIXED: Regex = Regex::new(r"^(\d+)\s+(\d+)\s*/\s*(\d+)\s*").unwrap();
    static ref QTY_RANGE: Regex = Regex::new(
        r"^(\d+(?:[.,]\d+)?)\s*(?:[-–]|\s(?:o|to)\s)\s*(\d+(?:[.,]\d+)?)\s*"
    ).unwrap();
    static ref QTY_UNICODE: Regex =
        Regex::new(r"^(?:(\d+)\s*)?([½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞])\s*").unwrap();
    static ref QTY_FRACTION: Regex = Regex::new(r"^(\d+)\s*/\s*(\d+)\s*").unwrap();
    static ref QTY_DECIMAL: Regex = Regex::new(r"^(\d+(?:[.,]\d+)?)\s*").unwrap();

    static ref TO_TASTE: Regex =
        Regex::new(r"(?i)[\s,]*(?:al gusto|a gusto|to taste)\.?\s*$").unwrap();
    static ref CONJUNCTION: Regex = Regex::new(r"(?i)\s+(?:y|and)\s+").unwrap();
}

const LEADING_FILLER: [&str; 14] = [
    "de", "del", "la", "el", "las", "los", "un", "una", "unos", "unas", "of", "the", "a", "an",
];

/// Parses ingredient blocks line by line into structured entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngredientExtractor;

impl IngredientExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parses every line of an ingredients block.
    ///
    /// Never fails; lines that look like steps are skipped, and a line
    /// whose name parses to empty contributes no entry. A line naming two
    /// ingredients joined by " y "/" and " becomes one entry per conjunct.
    pub fn extract(&self, block: &str) -> Vec<ParsedIngredientLine> {
        block
            .lines()
            .flat_map(|line| self.parse_line(line))
            .collect()
    }

    /// Parses a single ingredient line into zero or more entries.
    pub fn parse_line(&self, line: &str) -> Vec<ParsedIngredientLine> {
        let trimmed = line.trim();
        if trimmed.is_empty() || STEP_MARKER.is_match(trimmed) {
            return Vec::new();
        }

        let mut text = BULLET.replace(trimmed, "").into_owned();

        // Optional flag must be read before parentheticals disappear
        let mut optional = false;
        if OPTIONAL_PAREN.is_match(&text) {
            optional = true;
        }
        if OPTIONAL_MARKER.is_match(&text) {
            optional = true;
            text = OPTIONAL_MARKER.replace(&text, "").into_owned();
        }
        text = PARENTHETICAL.replace_all(&text, "").trim().to_string();

        let (quantity, rest) = match_leading_quantity(&text);
        let (unit, name_part) = split_unit(&rest, quantity);
        let name = clean_name(&name_part);

        if name.is_empty() {
            trace!("Ingredient line reduced to empty name: {:?}", line);
            return Vec::new();
        }

        // "harina y azúcar" explodes into one entry per conjunct
        CONJUNCTION
            .split(&name)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| ParsedIngredientLine {
                quantity,
                unit: unit.clone(),
                name: part.to_string(),
                optional,
            })
            .collect()
    }
}

/// Matches a leading quantity token; ranges and "o"/"to" alternatives
/// collapse to their first value. Returns 0.0 and the untouched text when
/// no quantity is present.
fn match_leading_quantity(text: &str) -> (f64, String) {
    if let Some(caps) = QTY_MIXED.captures(text) {
        let whole: f64 = caps[1].parse().unwrap_or(0.0);
        let num: f64 = caps[2].parse().unwrap_or(0.0);
        let den: f64 = caps[3].parse().unwrap_or(1.0);
        if den > 0.0 {
            return (whole + num / den, text[caps[0].len()..].to_string());
        }
    }
    if let Some(caps) = QTY_RANGE.captures(text) {
        return (to_float(&caps[1]), text[caps[0].len()..].to_string());
    }
    if let Some(caps) = QTY_UNICODE.captures(text) {
        let whole: f64 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0);
        let glyph = caps[2].chars().next().unwrap_or(' ');
        let frac = measurement::unicode_fraction_value(glyph).unwrap_or(0.0);
        return (whole + frac, text[caps[0].len()..].to_string());
    }
    if let Some(caps) = QTY_FRACTION.captures(text) {
        let num: f64 = caps[1].parse().unwrap_or(0.0);
        let den: f64 = caps[2].parse().unwrap_or(1.0);
        if den > 0.0 {
            return (num / den, text[caps[0].len()..].to_string());
        }
    }
    if let Some(caps) = QTY_DECIMAL.captures(text) {
        return (to_float(&caps[1]), text[caps[0].len()..].to_string());
    }
    (0.0, text.to_string())
}

fn to_float(raw: &str) -> f64 {
    raw.replace(',', ".").parse().unwrap_or(0.0)
}

/// Consumes the first token as a unit when the synonym table knows it.
/// With a quantity but no recognizable unit the generic single-item filler
/// applies; without a quantity the unit stays empty.
fn split_unit(rest: &str, quantity: f64) -> (String, String) {
    let rest = rest.trim();
    if let Some((first, tail)) = rest.split_once(char::is_whitespace) {
        if measurement::is_known_unit(first) {
            return (first.to_lowercase(), tail.trim().to_string());
        }
    } else if !rest.is_empty() && measurement::is_known_unit(rest) {
        // A lone unit token is still a unit, leaving the name empty
        return (rest.to_lowercase(), String::new());
    }
    let default_unit = if quantity > 0.0 {
        DEFAULT_UNIT.to_string()
    } else {
        String::new()
    };
    (default_unit, rest.to_string())
}

/// Drops leading determiners/prepositions and trailing "al gusto" phrasing.
fn clean_name(name: &str) -> String {
    let mut name = TO_TASTE.replace(name, "").trim().to_string();

    loop {
        let lower = name.to_lowercase();
        let Some(filler) = LEADING_FILLER
            .iter()
            .find(|w| {
                lower.starts_with(**w)
                    && lower[w.len()..].starts_with(|c: char| c.is_whitespace())
            })
        else {
            break;
        };
        name = name[filler.len()..].trim_start().to_string();
    }

    name.trim_matches(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .to_string()
}
