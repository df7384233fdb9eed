//! Raw and validated datasets

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use crate::discount::schema::Field;

/// One data row of an upload, restricted to the four known fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 1-based position among the data rows (header excluded)
    pub number: usize,
    pub c_code: Cell,
    pub flash_price: Cell,
    pub consignment_price: Cell,
    pub speed_discount_price: Cell,
}

impl RawRow {
    pub fn get(&self, field: Field) -> &Cell {
        match field {
            Field::CCode => &self.c_code,
            Field::FlashPrice => &self.flash_price,
            Field::ConsignmentPrice => &self.consignment_price,
            Field::SpeedDiscountPrice => &self.speed_discount_price,
        }
    }

    fn set(&mut self, field: Field, cell: Cell) {
        match field {
            Field::CCode => self.c_code = cell,
            Field::FlashPrice => self.flash_price = cell,
            Field::ConsignmentPrice => self.consignment_price = cell,
            Field::SpeedDiscountPrice => self.speed_discount_price = cell,
        }
    }
}

/// An uploaded table as parsed, before validation
///
/// `columns` keeps every header name from the file so that missing fields
/// can be told apart from empty ones. Cells of unknown columns are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawDataset {
    /// Build from a header row and data rows of cells in header order
    pub fn from_rows<I>(columns: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<Cell>>,
    {
        // A repeated header maps to its first column only
        let mut positions: Vec<(usize, Field)> = Vec::new();
        for (i, name) in columns.iter().enumerate() {
            if let Some(field) = Field::from_name(name) {
                if positions.iter().all(|(_, f)| *f != field) {
                    positions.push((i, field));
                }
            }
        }

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| {
                let mut row = RawRow {
                    number: idx + 1,
                    ..RawRow::default()
                };
                for (col, field) in &positions {
                    if let Some(cell) = cells.get(*col) {
                        row.set(*field, cell.clone());
                    }
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.columns.iter().any(|c| c == field.name())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// A row ready to be appended, typed per the table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRecord {
    pub c_code: String,
    pub flash_price: Option<f64>,
    pub consignment_price: Option<f64>,
    pub speed_discount_price: Option<f64>,
}

impl DiscountRecord {
    pub fn new(
        c_code: impl Into<String>,
        flash_price: Option<f64>,
        consignment_price: Option<f64>,
        speed_discount_price: Option<f64>,
    ) -> Self {
        Self {
            c_code: c_code.into(),
            flash_price,
            consignment_price,
            speed_discount_price,
        }
    }
}

/// Output of normalization; the only input the ingestor accepts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedDataset {
    records: Vec<DiscountRecord>,
}

impl ValidatedDataset {
    pub(crate) fn new(records: Vec<DiscountRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DiscountRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
