use crate::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

pub const ORGANIZATION_NUMBER_MAX_LEN: usize = 9;

/// The registry's stable primary key for a business entity. Issued numbers
/// are nine ASCII digits; shorter all-digit identifiers from older exports
/// are accepted as-is rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OrganizationNumber(String);

impl OrganizationNumber {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError(
                "organization number must not be empty".to_string(),
            ));
        }
        if s.len() > ORGANIZATION_NUMBER_MAX_LEN || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError(format!(
                "organization number must be at most {ORGANIZATION_NUMBER_MAX_LEN} digits, got `{s}`"
            )));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for OrganizationNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registry entity: the indexed projection (number, name, type) plus the
/// full original record for full-fidelity retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub organization_number: OrganizationNumber,
    pub name: String,
    pub organization_type: String,
    pub data: Value,
}

impl Company {
    /// Parses a raw bulk-export record. Requires `organisasjonsnummer` and
    /// `navn`; `organisasjonsform.kode` defaults to empty when absent. The
    /// record itself is retained untouched in `data`.
    pub fn from_registry_record(record: Value) -> Result<Self, ValidationError> {
        let number = record
            .get("organisasjonsnummer")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ValidationError("company record missing organisasjonsnummer".to_string())
            })?;
        let organization_number = OrganizationNumber::parse(number)?;
        let name = record
            .get("navn")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ValidationError(format!(
                    "company record {organization_number} missing navn"
                ))
            })?
            .to_string();
        let organization_type = record
            .get("organisasjonsform")
            .and_then(|form| form.get("kode"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            organization_number,
            name,
            organization_type,
            data: record,
        })
    }

    /// Postal code of the business address, when present.
    #[must_use]
    pub fn postal_code(&self) -> Option<&str> {
        self.data
            .get("forretningsadresse")
            .and_then(|addr| addr.get("postnummer"))
            .and_then(Value::as_str)
    }

    /// Municipality of the business address, when present.
    #[must_use]
    pub fn municipality(&self) -> Option<&str> {
        self.data
            .get("forretningsadresse")
            .and_then(|addr| addr.get("kommune"))
            .and_then(Value::as_str)
    }

    /// Primary industry code (`naeringskode1.kode`), when present.
    #[must_use]
    pub fn industry_code(&self) -> Option<&str> {
        self.data
            .get("naeringskode1")
            .and_then(|code| code.get("kode"))
            .and_then(Value::as_str)
    }
}
