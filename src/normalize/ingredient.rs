//! Ingredient entity normalization, scaling and merging.
//!
//! Raw parsed entries become canonical [`Ingredient`] values here: noise
//! filtered, filler unit applied, weight/volume quantities folded to the
//! canonical unit with the 1000-threshold upgrade (1500 g renders as kg).
//! Everything is value-in, value-out; nothing mutates in place.

use crate::error::ExtractError;
use crate::model::{Ingredient, RawIngredient, DEFAULT_UNIT};
use crate::normalize::measurement::{
    MeasurementNormalizer, UnitClass, CANONICAL_VOLUME, CANONICAL_WEIGHT,
};
use log::debug;
use std::collections::HashMap;

/// Names longer than this are treated as extraction noise, not ingredients.
pub const MAX_NAME_LEN: usize = 80;

/// Converts raw ingredient records into canonical entities.
#[derive(Debug, Clone, Copy)]
pub struct IngredientNormalizer {
    measurements: MeasurementNormalizer,
    max_name_len: usize,
}

impl Default for IngredientNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientNormalizer {
    pub fn new() -> Self {
        Self {
            measurements: MeasurementNormalizer::new(),
            max_name_len: MAX_NAME_LEN,
        }
    }

    /// Overrides the noise-length threshold for ingredient names.
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// Normalizes raw records into canonical ingredients.
    ///
    /// Entries with an empty or overly long name are dropped as noise. A
    /// missing unit becomes the filler unit; known weight/volume units are
    /// converted to their canonical form.
    pub fn normalize(&self, raw: &[RawIngredient]) -> Vec<Ingredient> {
        raw.iter()
            .filter_map(|entry| self.normalize_one(entry))
            .collect()
    }

    fn normalize_one(&self, raw: &RawIngredient) -> Option<Ingredient> {
        let name = raw.name.trim();
        if name.is_empty() {
            return None;
        }
        if name.chars().count() > self.max_name_len {
            debug!("Dropping noisy ingredient name ({} chars)", name.chars().count());
            return None;
        }

        let unit = raw.unit.trim();
        let unit = if unit.is_empty() { DEFAULT_UNIT } else { unit };
        let (quantity, unit) = self.normalize_quantity_unit(raw.quantity, unit);

        Some(Ingredient::new(name, quantity, unit))
    }

    /// Folds a quantity/unit pair to canonical form with the 1000-threshold
    /// upgrade: ≥1000 g renders as kg, ≥1000 ml as l, and smaller amounts
    /// fall back down. Unknown units pass through untouched; this is a read
    /// path and degrades rather than failing.
    pub fn normalize_quantity_unit(&self, quantity: f64, unit: &str) -> (f64, String) {
        let class = match self.measurements.classify(unit) {
            Ok(class) => class,
            Err(_) => return (quantity, unit.to_string()),
        };
        match class {
            UnitClass::Weight | UnitClass::Volume => {
                // convert() cannot fail here: classify() accepted the unit
                let (base, canonical) = self
                    .measurements
                    .convert(quantity, unit)
                    .unwrap_or((quantity, unit.to_string()));
                upgrade_threshold(base, &canonical)
            }
            UnitClass::Count | UnitClass::Other => {
                let (q, u) = self
                    .measurements
                    .convert(quantity, unit)
                    .unwrap_or((quantity, unit.to_string()));
                (q, u)
            }
        }
    }

    /// Multiplies every quantity by `factor` and re-normalizes units so
    /// scaled amounts cross the g/kg and ml/l thresholds correctly.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidScaleFactor`] for factors ≤ 0 or NaN.
    pub fn scale_ingredients(
        &self,
        ingredients: &[Ingredient],
        factor: f64,
    ) -> Result<Vec<Ingredient>, ExtractError> {
        if !(factor > 0.0) {
            return Err(ExtractError::InvalidScaleFactor(factor));
        }
        Ok(ingredients
            .iter()
            .map(|ing| {
                let (quantity, unit) =
                    self.normalize_quantity_unit(ing.quantity * factor, &ing.unit);
                Ingredient::new(ing.name.clone(), quantity, unit)
            })
            .collect())
    }

    /// Merges ingredients by (lowercased name, unit), summing quantities
    /// within each group and re-normalizing the sum. Group output order is
    /// not guaranteed to follow input order.
    pub fn merge_ingredients(&self, ingredients: &[Ingredient]) -> Vec<Ingredient> {
        let mut groups: HashMap<(String, String), (String, f64)> = HashMap::new();
        for ing in ingredients {
            let key = (ing.name.to_lowercase(), ing.unit.clone());
            let entry = groups.entry(key).or_insert_with(|| (ing.name.clone(), 0.0));
            entry.1 += ing.quantity;
        }

        groups
            .into_iter()
            .map(|((_, unit), (name, total))| {
                let (quantity, unit) = self.normalize_quantity_unit(total, &unit);
                Ingredient::new(name, quantity, unit)
            })
            .collect()
    }
}

/// Applies the 1000-threshold upgrade to a base-unit quantity.
fn upgrade_threshold(base: f64, canonical: &str) -> (f64, String) {
    match canonical {
        CANONICAL_WEIGHT if base >= 1000.0 => (base / 1000.0, "kg".to_string()),
        CANONICAL_VOLUME if base >= 1000.0 => (base / 1000.0, "l".to_string()),
        _ => (base, canonical.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, quantity: f64, unit: &str) -> RawIngredient {
        RawIngredient {
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_missing_unit_gets_filler() {
        let normalizer = IngredientNormalizer::new();
        let out = normalizer.normalize(&[raw("sal", 1.0, "")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].unit, DEFAULT_UNIT);
    }

    #[test]
    fn test_noise_names_dropped() {
        let normalizer = IngredientNormalizer::new();
        let long_name = "x".repeat(MAX_NAME_LEN + 1);
        let out = normalizer.normalize(&[raw(&long_name, 1.0, "g"), raw("", 1.0, "g")]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_kg_threshold_upgrade() {
        let normalizer = IngredientNormalizer::new();
        let out = normalizer.normalize(&[raw("harina", 1500.0, "g")]);
        assert_eq!(out[0].unit, "kg");
        assert!((out[0].quantity - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_kg_downgrade_below_threshold() {
        let normalizer = IngredientNormalizer::new();
        let (q, unit) = normalizer.normalize_quantity_unit(0.5, "kg");
        assert_eq!(unit, "g");
        assert!((q - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_rejects_non_positive_factor() {
        let normalizer = IngredientNormalizer::new();
        let ingredients = vec![Ingredient::new("harina", 100.0, "g")];
        assert!(matches!(
            normalizer.scale_ingredients(&ingredients, 0.0),
            Err(ExtractError::InvalidScaleFactor(_))
        ));
        assert!(normalizer.scale_ingredients(&ingredients, -2.0).is_err());
    }

    #[test]
    fn test_scale_crosses_threshold() {
        let normalizer = IngredientNormalizer::new();
        let ingredients = vec![Ingredient::new("harina", 400.0, "g")];
        let scaled = normalizer.scale_ingredients(&ingredients, 3.0).unwrap();
        assert_eq!(scaled[0].unit, "kg");
        assert!((scaled[0].quantity - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_merge_sums_matching_groups() {
        let normalizer = IngredientNormalizer::new();
        let ingredients = vec![
            Ingredient::new("harina", 100.0, "g"),
            Ingredient::new("Harina", 200.0, "g"),
            Ingredient::new("azúcar", 50.0, "g"),
        ];
        let merged = normalizer.merge_ingredients(&ingredients);
        assert_eq!(merged.len(), 2);
        let flour = merged.iter().find(|i| i.name.to_lowercase() == "harina").unwrap();
        assert!((flour.quantity - 300.0).abs() < 1e-9);
        assert_eq!(flour.unit, "g");
    }

    #[test]
    fn test_merge_rescales_large_sums() {
        let normalizer = IngredientNormalizer::new();
        let ingredients = vec![
            Ingredient::new("harina", 600.0, "g"),
            Ingredient::new("harina", 600.0, "g"),
        ];
        let merged = normalizer.merge_ingredients(&ingredients);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].unit, "kg");
        assert!((merged[0].quantity - 1.2).abs() < 1e-9);
    }
}
