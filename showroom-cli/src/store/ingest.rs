//! Append validated datasets to the showroom_discount table
//!
//! Each call walks `Idle -> Authenticating -> Writing -> Succeeded | Failed`
//! and keeps nothing between calls. There is no retry and no rollback:
//! calling [`Ingestor::ingest`] twice with the same dataset appends it twice.

use log::{debug, error, info};

use super::credentials::CredentialProvider;
use super::models::TableRef;
use super::{StoreConnector, TableStore};
use crate::discount::{TableSchema, ValidatedDataset};
use crate::error::{Outcome, UploadError};

/// Progress of a single ingest call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Idle,
    Authenticating,
    Writing,
    Succeeded,
    Failed,
}

impl std::fmt::Display for IngestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestState::Idle => write!(f, "idle"),
            IngestState::Authenticating => write!(f, "authenticating"),
            IngestState::Writing => write!(f, "writing"),
            IngestState::Succeeded => write!(f, "succeeded"),
            IngestState::Failed => write!(f, "failed"),
        }
    }
}

/// What a successful append wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub table: TableRef,
    pub rows: u64,
}

impl IngestReport {
    pub fn message(&self) -> String {
        format!(
            "Successfully uploaded {} rows to {} table",
            self.rows, self.table.table_id
        )
    }
}

/// Writes datasets to one table with the fixed showroom_discount schema
pub struct Ingestor {
    credentials: Box<dyn CredentialProvider>,
    connector: Box<dyn StoreConnector>,
    table: TableRef,
    schema: TableSchema,
}

impl Ingestor {
    pub fn new(
        credentials: Box<dyn CredentialProvider>,
        connector: Box<dyn StoreConnector>,
        table: TableRef,
    ) -> Self {
        Self {
            credentials,
            connector,
            table,
            schema: TableSchema::showroom_discount(),
        }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Append the whole dataset in one bulk write
    pub async fn ingest(&self, dataset: &ValidatedDataset) -> Result<IngestReport, UploadError> {
        let mut state = IngestState::Idle;
        let result = self.run(dataset, &mut state).await;

        let state = match &result {
            Ok(report) => {
                info!("{}", report.message());
                transition(state, IngestState::Succeeded)
            }
            Err(err) => {
                error!("Ingest into {} failed: {}", self.table, err);
                transition(state, IngestState::Failed)
            }
        };
        debug!("Ingest finished in state {}", state);

        result
    }

    /// `(ok, message)` form of [`Ingestor::ingest`]
    pub async fn ingest_outcome(&self, dataset: &ValidatedDataset) -> Outcome {
        Outcome::from_result(&self.ingest(dataset).await, IngestReport::message)
    }

    async fn run(
        &self,
        dataset: &ValidatedDataset,
        state: &mut IngestState,
    ) -> Result<IngestReport, UploadError> {
        *state = transition(*state, IngestState::Authenticating);
        // Resolved before any network call; a missing key never reaches the store
        let key = self.credentials.load()?;
        let store: Box<dyn TableStore> = self.connector.connect(&key).await?;

        *state = transition(*state, IngestState::Writing);
        let rows = store
            .append(&self.table, &self.schema, dataset.records())
            .await?;

        Ok(IngestReport {
            table: self.table.clone(),
            rows,
        })
    }
}

fn transition(from: IngestState, to: IngestState) -> IngestState {
    debug!("Ingest state: {} -> {}", from, to);
    to
}
