// SPDX-License-Identifier: Apache-2.0

use crate::IngestError;
use brreg_model::{canonical, sha256_hex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const MANIFEST_FILE_NAME: &str = "extraction_manifest.json";
const MANIFEST_SCHEMA_VERSION: u64 = 1;

/// Sidecar written after extraction recording exactly which files were
/// produced, so the loader never has to re-derive intent from filename
/// substrings when multiple dated exports coexist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionManifest {
    pub schema_version: u64,
    pub created_at_epoch_seconds: u64,
    pub resources: Vec<ManifestResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestResource {
    pub kind: String,
    pub path: String,
    pub size_bytes: u64,
    pub checksum_sha256: String,
}

pub fn write_extraction_manifest(
    working_dir: &Path,
    resources: &[(&str, &Path)],
) -> Result<PathBuf, IngestError> {
    let mut entries = Vec::new();
    for (kind, path) in resources {
        let bytes = fs::read(path)
            .map_err(|e| IngestError(format!("read {} failed: {e}", path.display())))?;
        entries.push(ManifestResource {
            kind: (*kind).to_string(),
            path: path.display().to_string(),
            size_bytes: bytes.len() as u64,
            checksum_sha256: sha256_hex(&bytes),
        });
    }
    let manifest = ExtractionManifest {
        schema_version: MANIFEST_SCHEMA_VERSION,
        created_at_epoch_seconds: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| IngestError(e.to_string()))?
            .as_secs(),
        resources: entries,
    };
    let manifest_path = working_dir.join(MANIFEST_FILE_NAME);
    let tmp_path = working_dir.join(format!("{MANIFEST_FILE_NAME}.tmp"));
    let bytes = canonical::stable_json_bytes(&manifest).map_err(|e| IngestError(e.to_string()))?;
    fs::write(&tmp_path, bytes)
        .map_err(|e| IngestError(format!("write {} failed: {e}", tmp_path.display())))?;
    fs::rename(&tmp_path, &manifest_path)
        .map_err(|e| IngestError(format!("rename to {} failed: {e}", manifest_path.display())))?;
    Ok(manifest_path)
}

pub fn read_extraction_manifest(working_dir: &Path) -> Result<ExtractionManifest, IngestError> {
    let manifest_path = working_dir.join(MANIFEST_FILE_NAME);
    let bytes = fs::read(&manifest_path)
        .map_err(|e| IngestError(format!("read {} failed: {e}", manifest_path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| IngestError(format!("parse {} failed: {e}", manifest_path.display())))
}

/// Locates the extracted file for `kind` ("companies" or "roles"). The
/// manifest is authoritative when present; otherwise falls back to the
/// legacy substring-plus-extension scan, newest modification time winning.
/// A miss is a fatal precondition error naming the searched directory.
pub fn resolve_resource(working_dir: &Path, kind: &str) -> Result<PathBuf, IngestError> {
    if working_dir.join(MANIFEST_FILE_NAME).exists() {
        let manifest = read_extraction_manifest(working_dir)?;
        let entry = manifest
            .resources
            .iter()
            .find(|r| r.kind == kind)
            .ok_or_else(|| {
                IngestError(format!(
                    "extraction manifest in {} has no {kind} entry",
                    working_dir.display()
                ))
            })?;
        let path = PathBuf::from(&entry.path);
        if !path.exists() {
            return Err(IngestError(format!(
                "manifest lists {kind} file {} but it does not exist",
                path.display()
            )));
        }
        return Ok(path);
    }
    scan_for_resource(working_dir, kind)
}

fn scan_for_resource(working_dir: &Path, kind: &str) -> Result<PathBuf, IngestError> {
    let entries = fs::read_dir(working_dir)
        .map_err(|e| IngestError(format!("read dir {} failed: {e}", working_dir.display())))?;
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| IngestError(e.to_string()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.contains(kind) || !name.ends_with(".json") {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(UNIX_EPOCH);
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, entry.path()));
        }
    }
    newest.map(|(_, path)| path).ok_or_else(|| {
        IngestError(format!(
            "no extracted {kind} file found in {}; run the fetch step first",
            working_dir.display()
        ))
    })
}
