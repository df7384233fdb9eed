//! Table references

use std::str::FromStr;

use anyhow::bail;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default destination of uploads
pub const DEFAULT_TABLE: &str = "pricing-338819.wholesale_test.showroom_discount";

static TABLE_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z][a-z0-9\-]{4,28}[a-z0-9]|[a-z0-9.\-]+:[a-z][a-z0-9\-]{4,28}[a-z0-9])\.([A-Za-z0-9_]{1,1024})\.([\w\-]{1,1024})$")
        .expect("table reference pattern is valid")
});

/// Fully-qualified `project.dataset.table` reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl FromStr for TableRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(caps) = TABLE_REF_RE.captures(s) else {
            bail!(
                "Invalid table reference '{}': expected project.dataset.table",
                s
            );
        };

        Ok(Self {
            project_id: caps[1].to_string(),
            dataset_id: caps[2].to_string(),
            table_id: caps[3].to_string(),
        })
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_table() {
        let table: TableRef = DEFAULT_TABLE.parse().unwrap();
        assert_eq!(table.project_id, "pricing-338819");
        assert_eq!(table.dataset_id, "wholesale_test");
        assert_eq!(table.table_id, "showroom_discount");
        assert_eq!(table.to_string(), DEFAULT_TABLE);
    }

    #[test]
    fn test_parse_domain_scoped_project() {
        let table: TableRef = "example.com:pricing-prod.sales.discounts".parse().unwrap();
        assert_eq!(table.project_id, "example.com:pricing-prod");
        assert_eq!(table.dataset_id, "sales");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("showroom_discount".parse::<TableRef>().is_err());
        assert!("project.dataset".parse::<TableRef>().is_err());
        assert!("Pricing.data.table".parse::<TableRef>().is_err());
        assert!("pricing-338819.bad dataset.table".parse::<TableRef>().is_err());
    }

    #[test]
    fn test_serialize_camel_case() {
        let table: TableRef = DEFAULT_TABLE.parse().unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["projectId"], "pricing-338819");
        assert_eq!(json["datasetId"], "wholesale_test");
        assert_eq!(json["tableId"], "showroom_discount");
    }
}
