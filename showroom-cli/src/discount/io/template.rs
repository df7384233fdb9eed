//! Downloadable example upload in CSV and Excel form

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::discount::schema::Field;
use crate::discount::types::DiscountRecord;

pub const CSV_FILE_NAME: &str = "showroom_discount_template.csv";
pub const XLSX_FILE_NAME: &str = "showroom_discount_template.xlsx";
pub const SHEET_NAME: &str = "showroom_discount";

/// Sample rows shown to users; purely illustrative
pub fn template_records() -> Vec<DiscountRecord> {
    vec![
        DiscountRecord::new("c-001", Some(25000.0), Some(27000.0), Some(24000.0)),
        DiscountRecord::new("c-002", Some(30000.0), Some(32000.0), Some(29000.0)),
        DiscountRecord::new("c-003", Some(22000.0), Some(24000.0), Some(21000.0)),
    ]
}

/// Write the template as CSV (header plus sample rows)
pub fn write_template_csv<W: Write>(writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in template_records() {
        csv_writer
            .serialize(&record)
            .context("Failed to write template row")?;
    }
    csv_writer.flush().context("Failed to flush CSV template")?;
    Ok(())
}

/// Write the template as a single-sheet xlsx workbook
pub fn write_template_excel(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name(SHEET_NAME)?;
    write_header(worksheet)?;

    for (idx, record) in template_records().iter().enumerate() {
        write_record(worksheet, (idx + 1) as u32, record)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}

fn write_header(ws: &mut Worksheet) -> Result<()> {
    let bold = Format::new().set_bold();
    for (col, field) in Field::ALL.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, field.name(), &bold)?;
        ws.set_column_width(col as u16, 22)?;
    }
    Ok(())
}

fn write_record(ws: &mut Worksheet, row: u32, record: &DiscountRecord) -> Result<()> {
    ws.write_string(row, 0, &record.c_code)?;

    let prices = [
        record.flash_price,
        record.consignment_price,
        record.speed_discount_price,
    ];
    for (offset, price) in prices.iter().enumerate() {
        // Null prices stay as empty cells
        if let Some(value) = price {
            ws.write_number(row, (offset + 1) as u16, *value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::io::read_dataset;
    use crate::discount::validate::normalize;

    #[test]
    fn test_csv_template_content() {
        let mut buf = Vec::new();
        write_template_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("c_code,flash_price,consignment_price,speed_discount_price")
        );
        assert_eq!(lines.next(), Some("c-001,25000.0,27000.0,24000.0"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_templates_pass_validation() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join(CSV_FILE_NAME);
        let file = std::fs::File::create(&csv_path).unwrap();
        write_template_csv(file).unwrap();

        let xlsx_path = dir.path().join(XLSX_FILE_NAME);
        write_template_excel(&xlsx_path).unwrap();

        for path in [csv_path, xlsx_path] {
            let dataset = read_dataset(&path).unwrap();
            let validated = normalize(&dataset).unwrap();
            assert_eq!(validated.records(), template_records().as_slice());
        }
    }
}
