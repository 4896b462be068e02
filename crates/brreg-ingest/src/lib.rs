// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod archive;
mod fetch;
mod load;
mod logging;
mod manifest;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const CRATE_NAME: &str = "brreg-ingest";

pub use archive::download_and_extract_zip;
pub use fetch::{fetch_resource, Transport};
pub use load::{load_registry_store, materialize_snapshot, open_registry_store, LoadReport};
pub use logging::{IngestEvent, IngestLog, IngestStage};
pub use manifest::{
    read_extraction_manifest, resolve_resource, write_extraction_manifest, ExtractionManifest,
    ManifestResource, MANIFEST_FILE_NAME,
};

#[derive(Debug)]
pub struct IngestError(pub String);

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IngestError {}

/// One refresh cycle of the registry working directory and store. The two
/// known export endpoints disagree about delivery format, so the transport
/// is an explicit per-resource parameter rather than something inferred
/// from the URL or filename.
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    pub companies_url: String,
    pub companies_transport: Transport,
    pub roles_url: String,
    pub roles_transport: Transport,
    pub working_dir: PathBuf,
    pub db_path: PathBuf,
    pub snapshot_path: Option<PathBuf>,
    /// ISO date stamped into the extracted file names.
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub companies_path: PathBuf,
    pub roles_path: PathBuf,
    pub manifest_path: PathBuf,
    pub db_path: PathBuf,
    pub snapshot_path: Option<PathBuf>,
    pub report: LoadReport,
    pub events: Vec<IngestEvent>,
}

/// Runs the operator-invoked batch pipeline: fetch -> extract -> load
/// (-> optional snapshot). Steps are strictly ordered and the first failure
/// halts the run; nothing is retried.
pub fn run_registry_refresh(opts: &RefreshOptions) -> Result<RefreshResult, IngestError> {
    let mut log = IngestLog::default();
    log.emit(IngestStage::Fetch, "refresh.start", BTreeMap::new());

    let companies_name = format!("companies_{}.json", opts.date);
    let roles_name = format!("roles_{}.json", opts.date);

    let companies_path = fetch_one(
        &opts.companies_url,
        &opts.working_dir,
        &companies_name,
        opts.companies_transport,
        &mut log,
    )?;
    let roles_path = fetch_one(
        &opts.roles_url,
        &opts.working_dir,
        &roles_name,
        opts.roles_transport,
        &mut log,
    )?;

    let manifest_path = manifest::write_extraction_manifest(
        &opts.working_dir,
        &[
            ("companies", companies_path.as_path()),
            ("roles", roles_path.as_path()),
        ],
    )?;
    log.emit(
        IngestStage::Extract,
        "refresh.manifest.written",
        BTreeMap::from([("path".to_string(), manifest_path.display().to_string())]),
    );

    let report = load::load_registry_store(&opts.db_path, &opts.working_dir)?;
    log.emit(
        IngestStage::Load,
        "refresh.load.complete",
        BTreeMap::from([
            ("companies".to_string(), report.companies_loaded.to_string()),
            ("roles".to_string(), report.roles_loaded.to_string()),
            (
                "skipped".to_string(),
                (report.companies_skipped + report.roles_skipped).to_string(),
            ),
        ]),
    );

    if let Some(snapshot_path) = &opts.snapshot_path {
        let written = load::materialize_snapshot(&opts.db_path, snapshot_path)?;
        log.emit(
            IngestStage::Finalize,
            "refresh.snapshot.written",
            BTreeMap::from([
                ("path".to_string(), snapshot_path.display().to_string()),
                ("companies".to_string(), written.to_string()),
            ]),
        );
    }

    log.emit(IngestStage::Finalize, "refresh.complete", BTreeMap::new());
    Ok(RefreshResult {
        companies_path,
        roles_path,
        manifest_path,
        db_path: opts.db_path.clone(),
        snapshot_path: opts.snapshot_path.clone(),
        report,
        events: log.events().to_vec(),
    })
}

fn fetch_one(
    url: &str,
    working_dir: &std::path::Path,
    file_name: &str,
    transport: Transport,
    log: &mut IngestLog,
) -> Result<PathBuf, IngestError> {
    log.emit(
        IngestStage::Fetch,
        "refresh.fetch.begin",
        BTreeMap::from([
            ("file".to_string(), file_name.to_string()),
            ("transport".to_string(), transport.to_string()),
        ]),
    );
    let path = fetch::fetch_resource(url, working_dir, file_name, transport)?;
    log.emit(
        IngestStage::Fetch,
        "refresh.fetch.complete",
        BTreeMap::from([("path".to_string(), path.display().to_string())]),
    );
    Ok(path)
}
