use crate::ValidationError;
use serde::{Deserialize, Serialize};

/// Static reference entity: an administrative area grouping a set of
/// four-digit postal codes. Loaded once from the embedded table and never
/// mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Municipality {
    pub number: u32,
    pub name: String,
    pub county_number: u32,
    pub area_code: String,
    pub postal_codes: Vec<String>,
}

const MUNICIPALITY_TABLE_JSON: &str = include_str!("../data/municipalities.json");

/// Deserializes the embedded municipality reference table, preserving the
/// table's order. Call once at startup and share the result.
pub fn municipality_table() -> Result<Vec<Municipality>, ValidationError> {
    serde_json::from_str(MUNICIPALITY_TABLE_JSON)
        .map_err(|e| ValidationError(format!("embedded municipality table is invalid: {e}")))
}
