//! Persistent table store: credentials, connections and ingestion
//!
//! The ingestor only depends on the two traits below. The BigQuery
//! implementation lives in [`bigquery`]; tests plug in in-memory stores.

pub mod auth;
pub mod bigquery;
pub mod credentials;
pub mod ingest;
pub mod models;

use async_trait::async_trait;

use crate::discount::{DiscountRecord, TableSchema};
use crate::error::StoreError;

pub use bigquery::{BigQueryConnector, BigQuerySettings};
pub use credentials::{ChainProvider, KeyFileProvider, SecretsFileProvider, ServiceAccountKey};
pub use ingest::Ingestor;
pub use models::{DEFAULT_TABLE, TableRef};

/// A writable, append-only table store
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Append every record in one bulk operation and return the number of
    /// rows the store reports as written
    async fn append(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        records: &[DiscountRecord],
    ) -> Result<u64, StoreError>;
}

/// Turns credentials into an authenticated store handle
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, key: &ServiceAccountKey) -> Result<Box<dyn TableStore>, StoreError>;
}
