//! Showroom discount datasets: schema, parsing, templates and validation

pub mod io;
pub mod schema;
pub mod types;
pub mod validate;

pub use schema::{Field, FieldMode, TableSchema};
pub use types::{DiscountRecord, RawDataset, ValidatedDataset};
pub use validate::{normalize, validate};
