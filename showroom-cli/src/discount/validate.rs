//! Upload validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. every required column is present
//! 2. no row has an empty `c_code`
//! 3. `c_code` values are unique within the upload
//! 4. every price cell is numeric or empty
//!
//! [`check`] only reads the dataset. [`normalize`] runs the same checks and
//! builds a new [`ValidatedDataset`] with prices coerced to numbers.

use std::collections::HashSet;

use log::debug;

use super::schema::Field;
use super::types::{DiscountRecord, RawDataset, ValidatedDataset};
use crate::error::{Outcome, UploadError, ValidationError};

pub const SUCCESS_MESSAGE: &str = "Data validation successful";

/// Run every check without building anything
pub fn check(dataset: &RawDataset) -> Result<(), ValidationError> {
    check_columns(dataset)?;
    check_codes_present(dataset)?;
    check_codes_unique(dataset)?;
    for field in Field::PRICES {
        coerce_prices(dataset, field)?;
    }
    Ok(())
}

/// Check and produce the typed dataset that proceeds to ingestion
pub fn normalize(dataset: &RawDataset) -> Result<ValidatedDataset, ValidationError> {
    check_columns(dataset)?;
    let codes = check_codes_present(dataset)?;
    check_codes_unique(dataset)?;

    let flash = coerce_prices(dataset, Field::FlashPrice)?;
    let consignment = coerce_prices(dataset, Field::ConsignmentPrice)?;
    let speed = coerce_prices(dataset, Field::SpeedDiscountPrice)?;

    let records = codes
        .into_iter()
        .zip(flash)
        .zip(consignment)
        .zip(speed)
        .map(|(((code, flash), consignment), speed)| {
            DiscountRecord::new(code, flash, consignment, speed)
        })
        .collect();

    Ok(ValidatedDataset::new(records))
}

/// `(ok, message)` verdict on a dataset
pub fn validate(dataset: &RawDataset) -> Outcome {
    let result = check(dataset).map_err(UploadError::from);
    if let Err(err) = &result {
        debug!("Validation failed ({:?}): {}", err.kind(), err);
    }
    Outcome::from_result(&result, |_| SUCCESS_MESSAGE.to_string())
}

fn check_columns(dataset: &RawDataset) -> Result<(), ValidationError> {
    let missing: Vec<String> = Field::ALL
        .into_iter()
        .filter(|f| !dataset.has_column(*f))
        .map(|f| f.name().to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingColumns(missing))
    }
}

/// Returns the trimmed codes in row order
fn check_codes_present(dataset: &RawDataset) -> Result<Vec<String>, ValidationError> {
    let mut codes = Vec::with_capacity(dataset.row_count());
    let mut empty_rows = Vec::new();

    for row in &dataset.rows {
        match row.c_code.to_code() {
            Some(code) => codes.push(code),
            None => empty_rows.push(row.number),
        }
    }

    if empty_rows.is_empty() {
        Ok(codes)
    } else {
        Err(ValidationError::EmptyCode { rows: empty_rows })
    }
}

/// Reports second-and-later occurrences, each duplicated value once
fn check_codes_unique(dataset: &RawDataset) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for code in dataset.rows.iter().filter_map(|r| r.c_code.to_code()) {
        if !seen.insert(code.clone()) && reported.insert(code.clone()) {
            duplicates.push(code);
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::DuplicateCodes(duplicates))
    }
}

fn coerce_prices(dataset: &RawDataset, field: Field) -> Result<Vec<Option<f64>>, ValidationError> {
    dataset
        .rows
        .iter()
        .map(|row| {
            row.get(field)
                .to_price()
                .map_err(|bad| ValidationError::NonNumeric {
                    column: field.name(),
                    row: row.number,
                    value: bad.0,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, Data, ExcelDateTime, ExcelDateTimeType};

    use crate::discount::types::Cell;
    use crate::error::ErrorKind;

    fn header() -> Vec<String> {
        Field::ALL.iter().map(|f| f.name().to_string()).collect()
    }

    fn text(s: &str) -> Cell {
        Cell::from_text(s)
    }

    fn row(code: &str, flash: &str, consignment: &str, speed: &str) -> Vec<Cell> {
        vec![text(code), text(flash), text(consignment), text(speed)]
    }

    fn dataset(rows: Vec<Vec<Cell>>) -> RawDataset {
        RawDataset::from_rows(header(), rows)
    }

    #[test]
    fn test_scenario_a_valid_with_null_price() {
        let ds = dataset(vec![
            row("c-001", "25000", "27000", "24000"),
            row("c-002", "30000", "", "21000"),
        ]);

        let outcome = validate(&ds);
        assert!(outcome.ok);
        assert_eq!(outcome.message, SUCCESS_MESSAGE);

        let validated = normalize(&ds).unwrap();
        assert_eq!(
            validated.records(),
            &[
                DiscountRecord::new("c-001", Some(25000.0), Some(27000.0), Some(24000.0)),
                DiscountRecord::new("c-002", Some(30000.0), None, Some(21000.0)),
            ]
        );
    }

    #[test]
    fn test_scenario_b_duplicate_code() {
        let ds = dataset(vec![
            row("c-001", "25000", "27000", "24000"),
            row("c-001", "30000", "32000", "29000"),
        ]);

        let outcome = validate(&ds);
        assert!(!outcome.ok);
        assert_eq!(outcome.message, "Duplicate c_code values found: c-001");
    }

    #[test]
    fn test_scenario_c_empty_code() {
        let ds = dataset(vec![row("", "25000", "27000", "24000")]);

        let outcome = validate(&ds);
        assert!(!outcome.ok);
        assert!(outcome.message.contains("c_code column cannot have empty values"));
        assert_eq!(
            check(&ds),
            Err(ValidationError::EmptyCode { rows: vec![1] })
        );
    }

    #[test]
    fn test_scenario_d_non_numeric_price() {
        let ds = dataset(vec![row("c-001", "abc", "27000", "24000")]);

        let outcome = validate(&ds);
        assert!(!outcome.ok);
        assert!(outcome.message.contains("flash_price"));
        assert_eq!(
            check(&ds),
            Err(ValidationError::NonNumeric {
                column: "flash_price",
                row: 1,
                value: "abc".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_columns_named_in_order() {
        let ds = RawDataset::from_rows(
            vec!["consignment_price".to_string(), "c_code".to_string()],
            vec![vec![text("1"), text("c-001")]],
        );

        let err = UploadError::from(normalize(&ds).unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err.to_string(),
            "Missing required columns: flash_price, speed_discount_price"
        );
    }

    #[test]
    fn test_structural_check_runs_before_row_checks() {
        // Empty and duplicate codes, but the missing column wins
        let ds = RawDataset::from_rows(
            vec!["c_code".to_string()],
            vec![vec![text("")], vec![text("x")], vec![text("x")]],
        );
        assert!(matches!(check(&ds), Err(ValidationError::MissingColumns(_))));
    }

    #[test]
    fn test_empty_check_runs_before_duplicate_check() {
        let ds = dataset(vec![
            row("c-001", "1", "1", "1"),
            row("c-001", "1", "1", "1"),
            row(" ", "1", "1", "1"),
        ]);
        assert_eq!(check(&ds), Err(ValidationError::EmptyCode { rows: vec![3] }));
    }

    #[test]
    fn test_duplicates_listed_once_in_first_extra_order() {
        let ds = dataset(vec![
            row("c-002", "", "", ""),
            row("c-001", "", "", ""),
            row("c-001", "", "", ""),
            row("c-002", "", "", ""),
            row("c-001", "", "", ""),
            row("c-003", "", "", ""),
        ]);
        assert_eq!(
            check(&ds),
            Err(ValidationError::DuplicateCodes(vec![
                "c-001".to_string(),
                "c-002".to_string(),
            ]))
        );
    }

    #[test]
    fn test_codes_compared_after_trimming() {
        let ds = dataset(vec![row("c-001", "", "", ""), row(" c-001", "", "", "")]);
        assert!(matches!(check(&ds), Err(ValidationError::DuplicateCodes(_))));
    }

    #[test]
    fn test_numeric_key_matches_text_key() {
        let ds = RawDataset::from_rows(
            header(),
            vec![
                vec![Cell::Number(1001.0), Cell::Empty, Cell::Empty, Cell::Empty],
                vec![text("1001"), Cell::Empty, Cell::Empty, Cell::Empty],
            ],
        );
        assert_eq!(
            check(&ds),
            Err(ValidationError::DuplicateCodes(vec!["1001".to_string()]))
        );
    }

    #[test]
    fn test_excel_error_in_price_column_is_rejected() {
        let ds = RawDataset::from_rows(
            header(),
            vec![vec![
                text("c-001"),
                Cell::from_excel(&Data::Error(CellErrorType::Div0)),
                text("27000"),
                text("24000"),
            ]],
        );

        let outcome = validate(&ds);
        assert!(!outcome.ok);
        assert!(outcome.message.contains("flash_price"));
        assert!(outcome.message.contains("#DIV/0!"));
        assert!(normalize(&ds).is_err());
    }

    #[test]
    fn test_excel_error_in_code_column_counts_as_empty() {
        let ds = RawDataset::from_rows(
            header(),
            vec![vec![
                Cell::from_excel(&Data::Error(CellErrorType::Value)),
                text("1"),
                text("1"),
                text("1"),
            ]],
        );
        assert_eq!(check(&ds), Err(ValidationError::EmptyCode { rows: vec![1] }));
    }

    #[test]
    fn test_date_in_price_column_is_rejected() {
        let date = ExcelDateTime::new(45000.5, ExcelDateTimeType::DateTime, false);
        let ds = RawDataset::from_rows(
            header(),
            vec![vec![
                text("c-001"),
                text("1"),
                Cell::from_excel(&Data::DateTime(date)),
                text("1"),
            ]],
        );
        assert!(matches!(
            check(&ds),
            Err(ValidationError::NonNumeric { column: "consignment_price", row: 1, .. })
        ));
    }

    #[test]
    fn test_price_columns_checked_in_order() {
        let ds = dataset(vec![
            row("c-001", "1", "oops", "1"),
            row("c-002", "bad", "1", "1"),
        ]);
        let err = check(&ds).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonNumeric {
                column: "flash_price",
                row: 2,
                value: "bad".to_string(),
            }
        );
    }

    #[test]
    fn test_all_null_prices_are_valid() {
        let ds = dataset(vec![row("c-001", "", "", "")]);
        let validated = normalize(&ds).unwrap();
        assert_eq!(
            validated.records(),
            &[DiscountRecord::new("c-001", None, None, None)]
        );
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let mut columns = header();
        columns.push("remarks".to_string());
        let ds = RawDataset::from_rows(
            columns,
            vec![vec![text("c-001"), text("1"), text("2"), text("3"), text("n/a")]],
        );
        assert!(validate(&ds).ok);
    }

    #[test]
    fn test_empty_dataset_is_valid() {
        let ds = dataset(Vec::new());
        let outcome = validate(&ds);
        assert!(outcome.ok);
        assert!(normalize(&ds).unwrap().is_empty());
    }

    #[test]
    fn test_validation_is_repeatable_and_does_not_mutate() {
        let ds = dataset(vec![
            row("c-001", "25000", "27000", "24000"),
            row("c-002", " 30000 ", "", "21000"),
        ]);
        let before = ds.clone();

        let first = normalize(&ds).unwrap();
        let second = normalize(&ds).unwrap();

        assert_eq!(first, second);
        assert_eq!(validate(&ds), validate(&ds));
        assert_eq!(ds, before);
    }
}
