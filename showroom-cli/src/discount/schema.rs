//! Fixed schema of the showroom_discount table
//!
//! The field order and types declared here are authoritative for every
//! write, whatever the uploaded file looked like.

use serde::{Deserialize, Serialize};

/// One of the four columns an upload must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CCode,
    FlashPrice,
    ConsignmentPrice,
    SpeedDiscountPrice,
}

impl Field {
    /// Canonical column order
    pub const ALL: [Field; 4] = [
        Field::CCode,
        Field::FlashPrice,
        Field::ConsignmentPrice,
        Field::SpeedDiscountPrice,
    ];

    pub const PRICES: [Field; 3] = [
        Field::FlashPrice,
        Field::ConsignmentPrice,
        Field::SpeedDiscountPrice,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::CCode => "c_code",
            Field::FlashPrice => "flash_price",
            Field::ConsignmentPrice => "consignment_price",
            Field::SpeedDiscountPrice => "speed_discount_price",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn field_type(self) -> FieldType {
        match self {
            Field::CCode => FieldType::String,
            _ => FieldType::Float64,
        }
    }

    pub fn mode(self) -> FieldMode {
        match self {
            Field::CCode => FieldMode::Required,
            _ => FieldMode::Nullable,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Float64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Required,
    Nullable,
}

/// A column declaration as sent to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: FieldMode,
}

/// Table schema in the shape the BigQuery API expects (`{"fields": [...]}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<SchemaField>,
}

impl TableSchema {
    /// The showroom_discount schema
    pub fn showroom_discount() -> Self {
        Self {
            fields: Field::ALL
                .into_iter()
                .map(|f| SchemaField {
                    name: f.name().to_string(),
                    field_type: f.field_type(),
                    mode: f.mode(),
                })
                .collect(),
        }
    }
}
