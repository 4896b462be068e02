// SPDX-License-Identifier: Apache-2.0

use crate::manifest::resolve_resource;
use crate::IngestError;
use brreg_model::{canonical, Company, RoleRecord};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const STORE_SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS companies (
      organization_number TEXT PRIMARY KEY,
      name TEXT NOT NULL,
      organization_type TEXT NOT NULL,
      data TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name);
    CREATE TABLE IF NOT EXISTS roles (
      organization_number TEXT NOT NULL,
      role_type TEXT NOT NULL,
      person_name TEXT NOT NULL,
      data TEXT NOT NULL,
      PRIMARY KEY (organization_number, role_type, person_name)
    );
    CREATE INDEX IF NOT EXISTS idx_roles_person_name ON roles(person_name);
";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub companies_loaded: usize,
    pub companies_skipped: usize,
    pub roles_loaded: usize,
    pub roles_skipped: usize,
}

/// Opens the registry store, initializing the schema if absent.
pub fn open_registry_store(db_path: &Path) -> Result<Connection, IngestError> {
    let conn = Connection::open(db_path)
        .map_err(|e| IngestError(format!("open store {} failed: {e}", db_path.display())))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
        .map_err(|e| IngestError(e.to_string()))?;
    conn.execute_batch(SCHEMA)
        .map_err(|e| IngestError(format!("store schema init failed: {e}")))?;
    conn.execute_batch(&format!("PRAGMA user_version={STORE_SCHEMA_VERSION};"))
        .map_err(|e| IngestError(e.to_string()))?;
    Ok(conn)
}

/// One-shot batch load of the extracted companies and roles files into the
/// store. Upsert semantics throughout: re-running against the same files
/// yields an identical store. Records missing their key fields are counted
/// and skipped, not fatal.
pub fn load_registry_store(db_path: &Path, working_dir: &Path) -> Result<LoadReport, IngestError> {
    let companies_path = resolve_resource(working_dir, "companies")?;
    let roles_path = resolve_resource(working_dir, "roles")?;

    let mut conn = open_registry_store(db_path)?;
    let mut report = LoadReport::default();

    let companies = read_record_array(&companies_path)?;
    let tx = conn.transaction().map_err(|e| IngestError(e.to_string()))?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO companies (organization_number, name, organization_type, data)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(organization_number) DO UPDATE SET
                   name=excluded.name,
                   organization_type=excluded.organization_type,
                   data=excluded.data",
            )
            .map_err(|e| IngestError(e.to_string()))?;
        for record in companies {
            match Company::from_registry_record(record) {
                Ok(company) => {
                    let data = canonical::stable_json_string(&company.data)
                        .map_err(|e| IngestError(e.to_string()))?;
                    stmt.execute(params![
                        company.organization_number.as_str(),
                        company.name,
                        company.organization_type,
                        data
                    ])
                    .map_err(|e| IngestError(format!("company upsert failed: {e}")))?;
                    report.companies_loaded += 1;
                }
                Err(_) => report.companies_skipped += 1,
            }
        }
    }
    tx.commit().map_err(|e| IngestError(e.to_string()))?;

    let roles = read_record_array(&roles_path)?;
    let tx = conn.transaction().map_err(|e| IngestError(e.to_string()))?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO roles (organization_number, role_type, person_name, data)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(organization_number, role_type, person_name) DO UPDATE SET
                   data=excluded.data",
            )
            .map_err(|e| IngestError(e.to_string()))?;
        for record in roles {
            match RoleRecord::from_registry_record(record) {
                Ok(role) => {
                    let data = canonical::stable_json_string(&role.data)
                        .map_err(|e| IngestError(e.to_string()))?;
                    stmt.execute(params![
                        role.organization_number.as_str(),
                        role.role_type,
                        role.person_name_key(),
                        data
                    ])
                    .map_err(|e| IngestError(format!("role upsert failed: {e}")))?;
                    report.roles_loaded += 1;
                }
                Err(_) => report.roles_skipped += 1,
            }
        }
    }
    tx.commit().map_err(|e| IngestError(e.to_string()))?;

    Ok(report)
}

/// Writes the companies table back out as one canonical JSON array: the
/// pre-materialized snapshot the web layer reads instead of querying the
/// store live. Returns the number of companies written.
pub fn materialize_snapshot(db_path: &Path, out_path: &Path) -> Result<usize, IngestError> {
    let conn = open_registry_store(db_path)?;
    let mut stmt = conn
        .prepare("SELECT data FROM companies ORDER BY organization_number")
        .map_err(|e| IngestError(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| IngestError(e.to_string()))?;

    let mut records: Vec<Value> = Vec::new();
    for row in rows {
        let text = row.map_err(|e| IngestError(e.to_string()))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| IngestError(format!("stored company record is invalid JSON: {e}")))?;
        records.push(value);
    }

    let bytes = canonical::stable_json_bytes(&records).map_err(|e| IngestError(e.to_string()))?;
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| IngestError(format!("create {} failed: {e}", parent.display())))?;
    }
    let tmp = out_path.with_extension("json.tmp");
    fs::write(&tmp, bytes)
        .map_err(|e| IngestError(format!("write {} failed: {e}", tmp.display())))?;
    fs::rename(&tmp, out_path)
        .map_err(|e| IngestError(format!("rename to {} failed: {e}", out_path.display())))?;
    Ok(records.len())
}

// The bulk export is one whole JSON array, not newline-delimited records.
fn read_record_array(path: &Path) -> Result<Vec<Value>, IngestError> {
    let bytes =
        fs::read(path).map_err(|e| IngestError(format!("read {} failed: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| IngestError(format!("{} is not a JSON record array: {e}", path.display())))
}
