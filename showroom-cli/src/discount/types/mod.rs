//! Dataset types for showroom discount uploads

mod cell;
mod record;

pub use cell::{Cell, format_number};
pub use record::{DiscountRecord, RawDataset, ValidatedDataset};
