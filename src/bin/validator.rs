//! SSP Validator CLI
//!
//! Validates SSP documents against the XSD schemas of their sub-standard.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use ssp_standard::{
    identifier_for_path, FileOptions, Mode, SspConfig, SspFile, UntypedDocument,
    UNKNOWN_IDENTIFIER,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "ssp-validate")]
#[command(about = "Validate SSP documents against their XSD schemas")]
struct Cli {
    /// Files or directories to validate
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Schema identifier to use instead of the one implied by the extension
    #[arg(short, long)]
    identifier: Option<String>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Print a JSON report instead of one line per file
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    identifier: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    generated_at: String,
    checked: usize,
    failed: usize,
    files: Vec<FileReport>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every document passed
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = SspConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    let options = FileOptions::from_config(&config).context("loading schemas")?;

    let files = collect_documents(&cli.paths, cli.identifier.is_some());
    if files.is_empty() {
        anyhow::bail!("no SSP documents found");
    }

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let identifier = match &cli.identifier {
            Some(identifier) => identifier.clone(),
            None => identifier_for_path(&path)
                .unwrap_or(UNKNOWN_IDENTIFIER)
                .to_string(),
        };
        let outcome = check_file(&path, &identifier, &options);
        results.push(FileReport {
            valid: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
            path,
            identifier,
        });
    }

    let failed = results.iter().filter(|r| !r.valid).count();

    if cli.json {
        let report = Report {
            generated_at: chrono::Utc::now().to_rfc3339(),
            checked: results.len(),
            failed,
            files: results,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for result in &results {
            match &result.error {
                None => println!("✅ {} ({})", result.path.display(), result.identifier),
                Some(error) => {
                    println!("❌ {} ({})", result.path.display(), result.identifier);
                    for line in error.lines() {
                        println!("   └─ {}", line);
                    }
                }
            }
        }
        println!();
        if failed == 0 {
            println!("✅ {} document(s) valid", results.len());
        } else {
            println!("❌ {} of {} document(s) invalid", failed, results.len());
        }
    }

    Ok(failed == 0)
}

/// Expand directories into the SSP documents below them.
///
/// Explicitly named files are always kept; inside directories only known
/// extensions are picked up unless every file is wanted.
fn collect_documents(paths: &[PathBuf], all_files: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if all_files || identifier_for_path(entry.path()).is_some() {
                files.push(entry.into_path());
            } else {
                debug!(path = %entry.path().display(), "Skipping non-SSP file");
            }
        }
    }
    files
}

fn check_file(path: &Path, identifier: &str, options: &FileOptions) -> ssp_standard::Result<()> {
    let mut file =
        SspFile::open_with_identifier(path, Mode::Read, identifier, UntypedDocument::default())?
            .with_options(options.clone());
    file.check_compliance()?;
    file.close()
}
