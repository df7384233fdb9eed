//! `upload` command: validate, confirm, then append to the discount table

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;
use is_terminal::IsTerminal;
use log::{info, warn};

use super::validate::inspect_file;
use crate::cli::UploadArgs;
use crate::config::Config;
use crate::discount::ValidatedDataset;
use crate::store::{BigQueryConnector, Ingestor, TableRef};

pub async fn handle_upload_command(args: UploadArgs, config: &Config) -> Result<ExitCode> {
    let table: TableRef = match &args.table {
        Some(table) => table.parse()?,
        None => config.table_ref()?,
    };

    let Some(dataset) = inspect_file(&args.file, args.preview) else {
        return Ok(ExitCode::FAILURE);
    };

    if dataset.is_empty() {
        warn!("{} has no data rows", args.file.display());
        if !args.allow_empty {
            println!(
                "{}",
                "Nothing to upload: the file has no data rows (use --allow-empty to send it anyway)"
                    .yellow()
            );
            return Ok(ExitCode::FAILURE);
        }
    }

    if !confirm_upload(&args, &dataset, &table)? {
        println!("Upload cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let connector = BigQueryConnector::new(config.bigquery_settings())
        .context("Failed to create BigQuery client")?;
    let ingestor = Ingestor::new(
        Box::new(config.credential_chain()),
        Box::new(connector),
        table,
    );

    info!("Appending {} rows to {}", dataset.len(), ingestor.table());
    print!("Uploading data to BigQuery...");
    std::io::stdout().flush().ok();
    let outcome = ingestor.ingest_outcome(&dataset).await;
    println!();

    if outcome.ok {
        println!("{}", outcome.message.green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", outcome.message.red());
        Ok(ExitCode::FAILURE)
    }
}

/// Ask before appending; non-interactive runs must pass `--yes`
fn confirm_upload(args: &UploadArgs, dataset: &ValidatedDataset, table: &TableRef) -> Result<bool> {
    if args.yes {
        info!("Confirmation skipped with --yes");
        return Ok(true);
    }

    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        anyhow::bail!("Refusing to upload without confirmation; pass --yes for non-interactive runs");
    }

    Confirm::new()
        .with_prompt(format!(
            "Append {} rows to {}? Rows are never replaced, so uploading twice duplicates them",
            dataset.len(),
            table.to_string().cyan()
        ))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
