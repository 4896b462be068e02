#![forbid(unsafe_code)]

use brreg_ingest::{
    fetch_resource, load_registry_store, materialize_snapshot, run_registry_refresh,
    RefreshOptions, Transport,
};
use brreg_model::{canonical, municipality_table};
use brreg_query::{normalize_company_name, CompanyDirectory, LocationIndex};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

#[derive(Parser)]
#[command(name = "brreg")]
#[command(about = "Registry refresh pipeline and location lookup CLI")]
struct Cli {
    /// Emit canonical single-line JSON instead of pretty JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full batch pipeline: fetch, extract, load, snapshot.
    Refresh {
        #[arg(long)]
        companies_url: String,
        #[arg(long, value_enum)]
        companies_transport: TransportCli,
        #[arg(long)]
        roles_url: String,
        #[arg(long, value_enum)]
        roles_transport: TransportCli,
        #[arg(long)]
        working_dir: PathBuf,
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// ISO date stamped into the extracted file names, e.g. 2024-06-01.
        #[arg(long)]
        date: String,
    },
    /// Fetch a single bulk resource with an explicit transport.
    Fetch {
        #[arg(long)]
        url: String,
        #[arg(long)]
        working_dir: PathBuf,
        #[arg(long)]
        file_name: String,
        #[arg(long, value_enum)]
        transport: TransportCli,
    },
    /// Load already-extracted files from a working directory into the store.
    Load {
        #[arg(long)]
        working_dir: PathBuf,
        #[arg(long)]
        db: PathBuf,
    },
    /// Materialize the companies snapshot from an existing store.
    Snapshot {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Location-normalizer lookups against the embedded municipality table.
    Lookup {
        #[command(subcommand)]
        command: LookupCommand,
    },
    /// Query companies in a snapshot by location term.
    Companies {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        location: String,
        #[arg(long, value_enum)]
        industry: Option<IndustryCli>,
    },
    /// Print the URL slug for a company name.
    Slug { name: String },
}

#[derive(Subcommand)]
enum LookupCommand {
    /// Resolve a four-digit postal code to its municipality.
    PostalCode { code: String },
    /// List up to eight administratively nearby municipalities.
    Nearby { name: String },
    /// List the whole municipality reference table.
    Municipalities,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TransportCli {
    Raw,
    Gzip,
    Zip,
}

impl From<TransportCli> for Transport {
    fn from(value: TransportCli) -> Self {
        match value {
            TransportCli::Raw => Transport::Raw,
            TransportCli::Gzip => Transport::Gzip,
            TransportCli::Zip => Transport::Zip,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IndustryCli {
    Accounting,
    Beauty,
}

#[derive(Debug, Clone, Copy)]
struct OutputMode {
    json: bool,
}

pub fn run() -> ProcessExitCode {
    let cli = Cli::parse();
    let output_mode = OutputMode { json: cli.json };
    match dispatch(cli.command, output_mode) {
        Ok(()) => ProcessExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ProcessExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands, output_mode: OutputMode) -> Result<(), String> {
    match command {
        Commands::Refresh {
            companies_url,
            companies_transport,
            roles_url,
            roles_transport,
            working_dir,
            db,
            snapshot,
            date,
        } => {
            let opts = RefreshOptions {
                companies_url,
                companies_transport: companies_transport.into(),
                roles_url,
                roles_transport: roles_transport.into(),
                working_dir,
                db_path: db,
                snapshot_path: snapshot,
                date,
            };
            let result = run_registry_refresh(&opts).map_err(|e| e.to_string())?;
            emit_ok(
                output_mode,
                json!({
                    "command": "brreg refresh",
                    "status": "ok",
                    "companies_path": result.companies_path,
                    "roles_path": result.roles_path,
                    "manifest_path": result.manifest_path,
                    "db_path": result.db_path,
                    "snapshot_path": result.snapshot_path,
                    "companies_loaded": result.report.companies_loaded,
                    "companies_skipped": result.report.companies_skipped,
                    "roles_loaded": result.report.roles_loaded,
                    "roles_skipped": result.report.roles_skipped,
                    "events": result.events,
                }),
            )
        }
        Commands::Fetch {
            url,
            working_dir,
            file_name,
            transport,
        } => {
            let path = fetch_resource(&url, &working_dir, &file_name, transport.into())
                .map_err(|e| e.to_string())?;
            emit_ok(
                output_mode,
                json!({
                    "command": "brreg fetch",
                    "status": "ok",
                    "path": path,
                }),
            )
        }
        Commands::Load { working_dir, db } => {
            let report = load_registry_store(&db, &working_dir).map_err(|e| e.to_string())?;
            emit_ok(
                output_mode,
                json!({
                    "command": "brreg load",
                    "status": "ok",
                    "companies_loaded": report.companies_loaded,
                    "companies_skipped": report.companies_skipped,
                    "roles_loaded": report.roles_loaded,
                    "roles_skipped": report.roles_skipped,
                }),
            )
        }
        Commands::Snapshot { db, out } => {
            let written = materialize_snapshot(&db, &out).map_err(|e| e.to_string())?;
            emit_ok(
                output_mode,
                json!({
                    "command": "brreg snapshot",
                    "status": "ok",
                    "out": out,
                    "companies": written,
                }),
            )
        }
        Commands::Lookup { command } => {
            let index = LocationIndex::new(municipality_table().map_err(|e| e.to_string())?);
            match command {
                LookupCommand::PostalCode { code } => emit_ok(
                    output_mode,
                    json!({
                        "command": "brreg lookup postal-code",
                        "status": "ok",
                        "postal_code": code,
                        "municipality": index.find_municipality_by_postal_code(&code),
                    }),
                ),
                LookupCommand::Nearby { name } => emit_ok(
                    output_mode,
                    json!({
                        "command": "brreg lookup nearby",
                        "status": "ok",
                        "municipality": name,
                        "nearby": index.nearby_municipalities(&name),
                    }),
                ),
                LookupCommand::Municipalities => emit_ok(
                    output_mode,
                    json!({
                        "command": "brreg lookup municipalities",
                        "status": "ok",
                        "municipalities": index.all_municipalities(),
                    }),
                ),
            }
        }
        Commands::Companies {
            snapshot,
            location,
            industry,
        } => {
            let index = LocationIndex::new(municipality_table().map_err(|e| e.to_string())?);
            let directory = CompanyDirectory::from_snapshot(&snapshot).map_err(|e| e.to_string())?;
            let companies = match industry {
                Some(IndustryCli::Accounting) => {
                    directory.accounting_firms_by_location(&index, &location)
                }
                Some(IndustryCli::Beauty) => {
                    directory.beauty_clinics_by_location(&index, &location)
                }
                None => directory.companies_by_location(&index, &location),
            };
            let listed: Vec<Value> = companies
                .iter()
                .map(|c| {
                    json!({
                        "organization_number": c.organization_number.as_str(),
                        "name": c.name,
                        "slug": normalize_company_name(&c.name),
                        "postal_code": c.postal_code(),
                        "municipality": c.municipality(),
                    })
                })
                .collect();
            emit_ok(
                output_mode,
                json!({
                    "command": "brreg companies",
                    "status": "ok",
                    "location": location,
                    "count": listed.len(),
                    "companies": listed,
                }),
            )
        }
        Commands::Slug { name } => emit_ok(
            output_mode,
            json!({
                "command": "brreg slug",
                "status": "ok",
                "name": name,
                "slug": normalize_company_name(&name),
            }),
        ),
    }
}


fn emit_ok(output_mode: OutputMode, payload: Value) -> Result<(), String> {
    if output_mode.json {
        let bytes = canonical::stable_json_bytes(&payload).map_err(|e| e.to_string())?;
        let text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
        );
    }
    Ok(())
}
