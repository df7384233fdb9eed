//! File I/O for uploads: reading user files and writing templates

mod reader;
mod template;

pub use reader::read_dataset;
pub use template::{
    CSV_FILE_NAME, SHEET_NAME, XLSX_FILE_NAME, template_records, write_template_csv,
    write_template_excel,
};
