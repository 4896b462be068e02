use crate::company::OrganizationNumber;
use crate::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A role held for an organization, e.g. an appointed accountant. The
/// composite `(organization_number, role_type, person_name)` is the natural
/// key; `person_name` is empty in the key when the role-holder is not a
/// natural person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub organization_number: OrganizationNumber,
    pub role_type: String,
    pub person_name: Option<String>,
    pub data: Value,
}

impl RoleRecord {
    pub fn from_registry_record(record: Value) -> Result<Self, ValidationError> {
        let number = record
            .get("organisasjonsnummer")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ValidationError("role record missing organisasjonsnummer".to_string())
            })?;
        let organization_number = OrganizationNumber::parse(number)?;
        let role_type = parse_role_type(&record).ok_or_else(|| {
            ValidationError(format!("role record for {organization_number} missing type"))
        })?;
        let person_name = parse_person_name(&record);
        Ok(Self {
            organization_number,
            role_type,
            person_name,
            data: record,
        })
    }

    /// Key part stored in the composite primary key; empty when the
    /// role-holder is an organization rather than a person.
    #[must_use]
    pub fn person_name_key(&self) -> &str {
        self.person_name.as_deref().unwrap_or("")
    }
}

// The bulk export has shipped the role type both as a plain string and as a
// coded object, so both shapes are accepted.
fn parse_role_type(record: &Value) -> Option<String> {
    match record.get("type") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Object(obj)) => obj
            .get("kode")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn parse_person_name(record: &Value) -> Option<String> {
    let navn = record.get("person")?.get("navn")?;
    match navn {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(parts) => {
            let mut assembled = Vec::new();
            for key in ["fornavn", "mellomnavn", "etternavn"] {
                if let Some(part) = parts.get(key).and_then(Value::as_str) {
                    let part = part.trim();
                    if !part.is_empty() {
                        assembled.push(part);
                    }
                }
            }
            if assembled.is_empty() {
                None
            } else {
                Some(assembled.join(" "))
            }
        }
        _ => None,
    }
}
