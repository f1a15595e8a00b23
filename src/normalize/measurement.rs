//! Measurement parsing and unit conversion.
//!
//! Quantities are parsed from free-form strings ("2 1/3 cups", "1-2 tazas",
//! "½ kg") and converted to a canonical unit per category: grams for weight,
//! milliliters for volume. Count and other units pass through unscaled.
//!
//! Unlike the rest of the extraction pipeline, an unrecognized unit here is
//! a hard error: it signals a caller contract violation, not messy input.

use crate::error::ExtractError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Canonical weight unit.
pub const CANONICAL_WEIGHT: &str = "g";
/// Canonical volume unit.
pub const CANONICAL_VOLUME: &str = "ml";

/// Category a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    Weight,
    Volume,
    Count,
    Other,
}

/// Conversion entry: category plus the multiplicative factor to the
/// category's base unit. Count/other units keep factor 1.0.
#[derive(Debug, Clone, Copy)]
struct UnitInfo {
    class: UnitClass,
    factor: f64,
}

lazy_static! {
    /// Abbreviations and synonyms folded before table lookup.
    static ref UNIT_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("tbsp", "tablespoon");
        m.insert("tbs", "tablespoon");
        m.insert("cda", "cucharada");
        m.insert("tsp", "teaspoon");
        m.insert("cdta", "cucharadita");
        m.insert("c", "cup");
        m.insert("tza", "taza");
        m.insert("fl oz", "fluid ounce");
        m.insert("floz", "fluid ounce");
        m.insert("gr", "gram");
        m.insert("grs", "gram");
        m.insert("kilo", "kilogram");
        m.insert("kg", "kilogram");
        m.insert("mg", "milligram");
        m.insert("oz", "ounce");
        m.insert("lb", "pound");
        m.insert("ml", "milliliter");
        m.insert("cl", "centiliter");
        m.insert("dl", "deciliter");
        m.insert("l", "liter");
        m.insert("lt", "liter");
        m.insert("ud", "unidad");
        m.insert("uds", "unidad");
        m.insert("pza", "pieza");
        m
    };

    /// Unit table covering weight, volume, count and other categories,
    /// Spanish and English spellings alike.
    static ref UNIT_TABLE: HashMap<&'static str, UnitInfo> = {
        use UnitClass::*;
        let w = |factor| UnitInfo { class: Weight, factor };
        let v = |factor| UnitInfo { class: Volume, factor };
        let c = UnitInfo { class: Count, factor: 1.0 };
        let o = UnitInfo { class: Other, factor: 1.0 };

        let mut m = HashMap::new();
        // Weight, base grams
        m.insert("g", w(1.0));
        m.insert("gram", w(1.0));
        m.insert("gramo", w(1.0));
        m.insert("kilogram", w(1000.0));
        m.insert("kilogramo", w(1000.0));
        m.insert("kg", w(1000.0));
        m.insert("milligram", w(0.001));
        m.insert("miligramo", w(0.001));
        m.insert("ounce", w(28.35));
        m.insert("onza", w(28.35));
        m.insert("pound", w(453.59));
        m.insert("libra", w(453.59));
        // Volume, base milliliters
        m.insert("milliliter", v(1.0));
        m.insert("mililitro", v(1.0));
        m.insert("ml", v(1.0));
        m.insert("centiliter", v(10.0));
        m.insert("centilitro", v(10.0));
        m.insert("deciliter", v(100.0));
        m.insert("decilitro", v(100.0));
        m.insert("liter", v(1000.0));
        m.insert("litro", v(1000.0));
        m.insert("l", v(1000.0));
        m.insert("cup", v(236.59));
        m.insert("taza", v(236.59));
        m.insert("tablespoon", v(14.79));
        m.insert("cucharada", v(14.79));
        m.insert("teaspoon", v(4.93));
        m.insert("cucharadita", v(4.93));
        m.insert("fluid ounce", v(29.57));
        // Count
        m.insert("unidad", c);
        m.insert("unit", c);
        m.insert("piece", c);
        m.insert("pieza", c);
        m.insert("diente", c);
        m.insert("clove", c);
        m.insert("rebanada", c);
        m.insert("slice", c);
        m.insert("lata", c);
        m.insert("can", c);
        m.insert("paquete", c);
        m.insert("package", c);
        m.insert("hoja", c);
        m.insert("rama", c);
        m.insert("manojo", c);
        m.insert("bunch", c);
        // Other (non-convertible measures)
        m.insert("pizca", o);
        m.insert("pinch", o);
        m.insert("chorrito", o);
        m.insert("dash", o);
        m.insert("puñado", o);
        m.insert("handful", o);
        m
    };

    /// Unicode vulgar fraction glyphs to their decimal values.
    static ref UNICODE_FRACTIONS: HashMap<char, f64> = {
        let mut m = HashMap::new();
        m.insert('½', 0.5);
        m.insert('⅓', 1.0 / 3.0);
        m.insert('⅔', 2.0 / 3.0);
        m.insert('¼', 0.25);
        m.insert('¾', 0.75);
        m.insert('⅕', 0.2);
        m.insert('⅖', 0.4);
        m.insert('⅗', 0.6);
        m.insert('⅘', 0.8);
        m.insert('⅙', 1.0 / 6.0);
        m.insert('⅚', 5.0 / 6.0);
        m.insert('⅛', 0.125);
        m.insert('⅜', 0.375);
        m.insert('⅝', 0.625);
        m.insert('⅞', 0.875);
        m
    };

    static ref MIXED_FRACTION_UNIT: Regex =
        Regex::new(r"^(\d+)\s+(\d+)\s*/\s*(\d+)\s*(.*)$").unwrap();
    static ref RANGE: Regex =
        Regex::new(r"^(\d+(?:[.,]\d+)?)\s*[-–]\s*(\d+(?:[.,]\d+)?)\s*(.*)$").unwrap();
    static ref UNICODE_FRACTION: Regex =
        Regex::new(r"^(?:(\d+)\s*)?([½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞])\s*(.*)$").unwrap();
    static ref PLAIN_FRACTION: Regex = Regex::new(r"^(\d+)\s*/\s*(\d+)\s*(.*)$").unwrap();
    static ref DECIMAL: Regex = Regex::new(r"^(\d+(?:[.,]\d+)?)\s*(.*)$").unwrap();
}

/// Parses and converts measurement strings to canonical (quantity, unit)
/// pairs, and renders them back into human-readable form.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurementNormalizer;

impl MeasurementNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parses a measurement string into a quantity and its canonical unit.
    ///
    /// Parsing priority: mixed fraction with unit, range (averaged),
    /// unicode fraction, mixed fraction, plain fraction, bare number.
    /// Weight and volume quantities come back rescaled to grams and
    /// milliliters; count/other units pass through singularized.
    ///
    /// # Errors
    /// Returns [`ExtractError::UnknownUnit`] when the trailing unit text is
    /// in no conversion table.
    pub fn normalize(&self, measurement: &str) -> Result<(f64, String), ExtractError> {
        let text = measurement.trim().to_lowercase();
        let (quantity, unit_text) = parse_quantity_string(&text);
        self.convert(quantity, &unit_text)
    }

    /// Converts an already-parsed quantity and unit to canonical form.
    pub fn convert(&self, quantity: f64, unit: &str) -> Result<(f64, String), ExtractError> {
        let unit = unit.trim();
        if unit.is_empty() {
            return Ok((quantity, String::new()));
        }
        let (name, info) = lookup_unit(unit)?;
        let converted = match info.class {
            UnitClass::Weight => (quantity * info.factor, CANONICAL_WEIGHT.to_string()),
            UnitClass::Volume => (quantity * info.factor, CANONICAL_VOLUME.to_string()),
            UnitClass::Count | UnitClass::Other => (quantity, name.to_string()),
        };
        Ok(converted)
    }

    /// Renders a canonical quantity back into a human string in `unit`.
    ///
    /// The scale factor is reversed and the value rendered as an integer
    /// when exact, as a simplified fraction with denominator up to 8 when
    /// close enough, or as a bare decimal otherwise.
    ///
    /// # Errors
    /// Returns [`ExtractError::UnknownUnit`] for units in no table.
    pub fn denormalize(&self, quantity: f64, unit: &str) -> Result<String, ExtractError> {
        let (name, info) = lookup_unit(unit)?;
        let value = quantity / info.factor;
        Ok(format!("{} {}", render_value(value), name))
    }

    /// Category of a unit, mainly useful to callers deciding whether two
    /// quantities are comparable.
    pub fn classify(&self, unit: &str) -> Result<UnitClass, ExtractError> {
        lookup_unit(unit).map(|(_, info)| info.class)
    }
}

/// Splits a measurement string into (quantity, trailing unit text).
///
/// Ranges average to their midpoint here. The ingredient line parser keeps
/// the first value of a range instead; the two policies are intentionally
/// left divergent as observed in production data.
pub fn parse_quantity_string(text: &str) -> (f64, String) {
    let text = text.trim();

    if let Some(caps) = MIXED_FRACTION_UNIT.captures(text) {
        let whole: f64 = caps[1].parse().unwrap_or(0.0);
        let num: f64 = caps[2].parse().unwrap_or(0.0);
        let den: f64 = caps[3].parse().unwrap_or(1.0);
        if den > 0.0 {
            return (whole + num / den, caps[4].to_string());
        }
    }
    if let Some(caps) = RANGE.captures(text) {
        let a = to_float(&caps[1]);
        let b = to_float(&caps[2]);
        return ((a + b) / 2.0, caps[3].to_string());
    }
    if let Some(caps) = UNICODE_FRACTION.captures(text) {
        let whole: f64 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0);
        let glyph = caps[2].chars().next().unwrap_or(' ');
        let frac = UNICODE_FRACTIONS.get(&glyph).copied().unwrap_or(0.0);
        return (whole + frac, caps[3].to_string());
    }
    if let Some(caps) = PLAIN_FRACTION.captures(text) {
        let num: f64 = caps[1].parse().unwrap_or(0.0);
        let den: f64 = caps[2].parse().unwrap_or(1.0);
        if den > 0.0 {
            return (num / den, caps[3].to_string());
        }
    }
    if let Some(caps) = DECIMAL.captures(text) {
        return (to_float(&caps[1]), caps[2].to_string());
    }

    (0.0, text.to_string())
}

/// Parses a decimal that may use a comma separator.
fn to_float(raw: &str) -> f64 {
    raw.replace(',', ".").parse().unwrap_or(0.0)
}

/// Folds a raw unit through alias and singularization steps, then looks it
/// up in the conversion table.
fn lookup_unit(raw: &str) -> Result<(&'static str, UnitInfo), ExtractError> {
    let unit = raw.trim().trim_end_matches('.').to_lowercase();

    for candidate in unit_candidates(&unit) {
        if let Some((name, info)) = UNIT_TABLE.get_key_value(candidate.as_str()) {
            return Ok((name, *info));
        }
    }
    Err(ExtractError::UnknownUnit(raw.trim().to_string()))
}

/// Lookup candidates for a unit string: as-is, aliased, singularized, and
/// singularized-then-aliased.
fn unit_candidates(unit: &str) -> Vec<String> {
    let mut candidates = vec![unit.to_string()];
    if let Some(alias) = UNIT_ALIASES.get(unit) {
        candidates.push((*alias).to_string());
    }
    if unit.len() > 1 {
        if let Some(singular) = unit.strip_suffix('s') {
            candidates.push(singular.to_string());
            if let Some(alias) = UNIT_ALIASES.get(singular) {
                candidates.push((*alias).to_string());
            }
        }
    }
    candidates
}

/// Whether a unit string is known to any conversion table.
pub fn is_known_unit(raw: &str) -> bool {
    lookup_unit(raw).is_ok()
}

/// Decimal value of a unicode vulgar fraction glyph, if it is one.
pub fn unicode_fraction_value(glyph: char) -> Option<f64> {
    UNICODE_FRACTIONS.get(&glyph).copied()
}

const VALUE_EPSILON: f64 = 0.01;
const MAX_DENOMINATOR: u32 = 8;

/// Renders a value as an integer, a simplified fraction (denominator up to
/// 8), or a plain decimal, in that preference order.
fn render_value(value: f64) -> String {
    if (value - value.round()).abs() < VALUE_EPSILON {
        return format!("{}", value.round() as i64);
    }

    let whole = value.floor();
    let frac = value - whole;
    for den in 2..=MAX_DENOMINATOR {
        let num = (frac * den as f64).round() as u32;
        if num == 0 || num >= den {
            continue;
        }
        if (frac - num as f64 / den as f64).abs() < VALUE_EPSILON {
            let (num, den) = reduce(num, den);
            if whole > 0.0 {
                return format!("{} {}/{}", whole as i64, num, den);
            }
            return format!("{}/{}", num, den);
        }
    }

    format!("{:.2}", value)
}

fn reduce(num: u32, den: u32) -> (u32, u32) {
    let g = gcd(num, den);
    (num / g, den / g)
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_decimal_returns_exact_value() {
        let (q, _) = parse_quantity_string("2.5");
        assert_eq!(q, 2.5);
        let (q, _) = parse_quantity_string("500 g");
        assert_eq!(q, 500.0);
    }

    #[test]
    fn test_range_averages() {
        let (q, unit) = parse_quantity_string("2-3 cups");
        assert!((q - 2.5).abs() < 1e-9);
        assert_eq!(unit, "cups");
    }

    #[test]
    fn test_unicode_fractions() {
        let (q, _) = parse_quantity_string("½ taza");
        assert!((q - 0.5).abs() < 1e-9);
        let (q, _) = parse_quantity_string("1 ½ tazas");
        assert!((q - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_fraction_with_unit() {
        let normalizer = MeasurementNormalizer::new();
        let (q, unit) = normalizer.normalize("2 1/3 cups").unwrap();
        assert_eq!(unit, "ml");
        assert!((q - (2.0 + 1.0 / 3.0) * 236.59).abs() < 0.01);
    }

    #[test]
    fn test_weight_rescaled_to_grams() {
        let normalizer = MeasurementNormalizer::new();
        let (q, unit) = normalizer.normalize("2 kg").unwrap();
        assert_eq!((q, unit.as_str()), (2000.0, "g"));
    }

    #[test]
    fn test_count_units_pass_through() {
        let normalizer = MeasurementNormalizer::new();
        let (q, unit) = normalizer.normalize("3 dientes").unwrap();
        assert_eq!(q, 3.0);
        assert_eq!(unit, "diente");
    }

    #[test]
    fn test_unknown_unit_is_hard_error() {
        let normalizer = MeasurementNormalizer::new();
        let err = normalizer.normalize("3 zorks").unwrap_err();
        assert!(matches!(err, ExtractError::UnknownUnit(u) if u == "zorks"));
    }

    #[test]
    fn test_denormalize_integer() {
        let normalizer = MeasurementNormalizer::new();
        assert_eq!(normalizer.denormalize(500.0, "g").unwrap(), "500 g");
    }

    #[test]
    fn test_denormalize_fraction() {
        let normalizer = MeasurementNormalizer::new();
        let rendered = normalizer.denormalize(552.04, "cup").unwrap();
        assert_eq!(rendered, "2 1/3 cup");
    }

    #[test]
    fn test_round_trip_is_stable() {
        let normalizer = MeasurementNormalizer::new();
        let (q, unit) = normalizer.normalize("500 g").unwrap();
        let rendered = normalizer.denormalize(q, &unit).unwrap();
        let (q2, unit2) = normalizer.normalize(&rendered).unwrap();
        assert!((q - q2).abs() < 1e-6);
        assert_eq!(unit, unit2);
    }

    #[test]
    fn test_abbreviations_fold() {
        let normalizer = MeasurementNormalizer::new();
        let (q, unit) = normalizer.normalize("1 tbsp").unwrap();
        assert_eq!(unit, "ml");
        assert!((q - 14.79).abs() < 1e-9);
        let (q, _) = normalizer.normalize("2 cdas").unwrap();
        assert!((q - 29.58).abs() < 1e-9);
    }
}
