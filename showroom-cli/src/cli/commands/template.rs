//! `template` command: write example upload files

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;
use log::debug;

use crate::cli::{TemplateArgs, TemplateFormat};
use crate::discount::io::{
    CSV_FILE_NAME, SHEET_NAME, XLSX_FILE_NAME, template_records, write_template_csv,
    write_template_excel,
};

pub fn handle_template_command(args: TemplateArgs) -> Result<ExitCode> {
    let written = write_templates(&args.dir, args.format, args.force)?;

    for path in &written {
        println!("{} {}", "Wrote".green(), path.display());
    }
    if args.format != TemplateFormat::Csv {
        println!("Excel sheet name: {}", SHEET_NAME.cyan());
    }

    println!();
    println!("{}", "Sample rows".bold());
    for record in template_records() {
        println!(
            "  {:<8} flash {:>8}  consignment {:>8}  speed {:>8}",
            record.c_code,
            price_text(record.flash_price),
            price_text(record.consignment_price),
            price_text(record.speed_discount_price),
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Write the requested template files into `dir` and return their paths
pub fn write_templates(dir: &Path, format: TemplateFormat, force: bool) -> Result<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = match format {
        TemplateFormat::Csv => vec![dir.join(CSV_FILE_NAME)],
        TemplateFormat::Xlsx => vec![dir.join(XLSX_FILE_NAME)],
        TemplateFormat::Both => vec![dir.join(CSV_FILE_NAME), dir.join(XLSX_FILE_NAME)],
    };

    // Check everything first so a refusal leaves no partial output
    if !force {
        if let Some(existing) = targets.iter().find(|p| p.exists()) {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                existing.display()
            );
        }
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    for path in &targets {
        debug!("Writing template {}", path.display());
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            let file = File::create(path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            write_template_csv(BufWriter::new(file))?;
        } else {
            write_template_excel(path)?;
        }
    }

    Ok(targets)
}

fn price_text(price: Option<f64>) -> String {
    price.map(|p| format!("{}", p)).unwrap_or_default()
}
