//! `validate` command: read, preview and check a file without uploading

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::*;
use log::info;

use super::preview::render_preview;
use super::report_failure;
use crate::cli::ValidateArgs;
use crate::discount::io::read_dataset;
use crate::discount::{ValidatedDataset, normalize, validate};
use crate::error::UploadError;

pub fn handle_validate_command(args: ValidateArgs) -> Result<ExitCode> {
    match inspect_file(&args.file, args.preview) {
        Some(_) => Ok(ExitCode::SUCCESS),
        None => Ok(ExitCode::FAILURE),
    }
}

/// Read and validate `path`, printing the summary, preview and result.
/// Returns the normalized dataset, or `None` after reporting why not.
pub(super) fn inspect_file(path: &Path, preview_rows: usize) -> Option<ValidatedDataset> {
    info!("Reading {}", path.display());
    let dataset = match read_dataset(path) {
        Ok(dataset) => dataset,
        Err(err) => {
            report_failure(&UploadError::from(err));
            return None;
        }
    };

    println!(
        "{} Found {} rows and {} columns.",
        "File loaded successfully!".green(),
        dataset.row_count(),
        dataset.column_count()
    );
    println!();
    println!("{}", "Data Preview".bold().underline());
    print!("{}", render_preview(&dataset, preview_rows));
    println!();

    let outcome = validate(&dataset);
    if !outcome.ok {
        eprintln!("{}", outcome.message.red());
        println!("Please fix the data issues and upload again.");
        return None;
    }
    println!("{}", outcome.message.green());

    match normalize(&dataset) {
        Ok(validated) => Some(validated),
        Err(err) => {
            report_failure(&err.into());
            None
        }
    }
}
