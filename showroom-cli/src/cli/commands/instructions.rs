//! `instructions` command: describe the expected upload format

use std::process::ExitCode;

use anyhow::Result;
use colored::*;

use crate::discount::io::{CSV_FILE_NAME, XLSX_FILE_NAME};
use crate::discount::{Field, FieldMode};

pub fn handle_instructions_command() -> Result<ExitCode> {
    println!("{}", "Upload format".bold().underline());
    println!("Accepted files: CSV (.csv) or Excel (.xlsx, .xlsm, .xls, .ods).");
    println!("Only the first sheet of a workbook is read; its first row is the header.");
    println!();

    println!("{}", "Required columns".bold());
    for field in Field::ALL {
        println!("  {:<22} {}", field.name().cyan(), describe(field));
    }
    println!();

    println!("{}", "Notes".bold());
    println!("  - Extra columns are allowed and ignored.");
    println!("  - c_code must be present and unique in every row.");
    println!("  - Prices may be left empty; anything else must be a number.");
    println!("  - Uploads are appended. Uploading the same file twice duplicates its rows.");
    println!();
    println!(
        "Run {} to get {} and {}.",
        "showroom-cli template".green(),
        CSV_FILE_NAME,
        XLSX_FILE_NAME
    );

    Ok(ExitCode::SUCCESS)
}

fn describe(field: Field) -> &'static str {
    match (field, field.mode()) {
        (Field::CCode, _) => "Car code identifier (text, required, unique)",
        (_, FieldMode::Nullable) => "Price (number, optional)",
        (_, FieldMode::Required) => "Price (number, required)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_descriptions() {
        assert!(describe(Field::CCode).starts_with("Car code identifier"));
        for field in Field::PRICES {
            assert_eq!(describe(field), "Price (number, optional)");
        }
    }
}
