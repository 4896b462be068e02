// SPDX-License-Identifier: Apache-2.0

use crate::slug::normalize_municipality_name;
use brreg_model::Municipality;
use std::collections::BTreeMap;

pub const NEARBY_LIMIT: usize = 8;

/// Immutable location index built once at process startup from the static
/// municipality reference table and shared by reference with every
/// component that resolves locations. Safe for unlimited concurrent reads.
#[derive(Debug)]
pub struct LocationIndex {
    municipalities: Vec<Municipality>,
    // postal code -> index into `municipalities`; later table entries win
    // on colliding codes (a data-quality issue, not a runtime error).
    postal_to_municipality: BTreeMap<String, usize>,
    slug_to_name: BTreeMap<String, String>,
}

impl LocationIndex {
    #[must_use]
    pub fn new(municipalities: Vec<Municipality>) -> Self {
        let mut postal_to_municipality = BTreeMap::new();
        let mut slug_to_name = BTreeMap::new();
        for (idx, municipality) in municipalities.iter().enumerate() {
            for code in &municipality.postal_codes {
                postal_to_municipality.insert(code.clone(), idx);
            }
            slug_to_name.insert(
                normalize_municipality_name(&municipality.name),
                municipality.name.clone(),
            );
        }
        Self {
            municipalities,
            postal_to_municipality,
            slug_to_name,
        }
    }

    /// Name of the municipality owning `code`, if any. A miss is routine,
    /// not an error.
    #[must_use]
    pub fn find_municipality_by_postal_code(&self, code: &str) -> Option<&str> {
        self.postal_to_municipality
            .get(code)
            .map(|&idx| self.municipalities[idx].name.as_str())
    }

    /// All municipalities in the stable order of the reference table.
    #[must_use]
    pub fn all_municipalities(&self) -> &[Municipality] {
        &self.municipalities
    }

    /// Canonical name for a municipality slug; unknown slugs come back
    /// unchanged so callers can degrade gracefully.
    #[must_use]
    pub fn denormalize_municipality_name(&self, slug: &str) -> String {
        self.slug_to_name
            .get(slug)
            .cloned()
            .unwrap_or_else(|| slug.to_string())
    }

    /// Up to [`NEARBY_LIMIT`] other municipalities in the same county whose
    /// first postal code starts with the same digit as the reference
    /// municipality's first postal code. A deliberate approximation of
    /// geographic proximity using administrative codes only; no geodata.
    #[must_use]
    pub fn nearby_municipalities(&self, city_name: &str) -> Vec<String> {
        let wanted = city_name.to_lowercase();
        let Some(reference) = self
            .municipalities
            .iter()
            .find(|m| m.name.to_lowercase() == wanted)
        else {
            return Vec::new();
        };
        let Some(reference_digit) = first_postal_digit(reference) else {
            return Vec::new();
        };
        self.municipalities
            .iter()
            .filter(|m| m.number != reference.number)
            .filter(|m| m.county_number == reference.county_number)
            .filter(|m| first_postal_digit(m) == Some(reference_digit))
            .take(NEARBY_LIMIT)
            .map(|m| m.name.clone())
            .collect()
    }
}

fn first_postal_digit(municipality: &Municipality) -> Option<char> {
    municipality
        .postal_codes
        .first()
        .and_then(|code| code.chars().next())
}
