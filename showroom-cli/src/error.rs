//! Error kinds and the boolean-plus-message outcome shown to users
//!
//! Every failure path of an upload ends up as one of the [`UploadError`]
//! variants. Callers that only need the human-readable contract convert the
//! result into an [`Outcome`].

use std::path::PathBuf;

use thiserror::Error;

/// Kind of failure, for callers that branch on the cause instead of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Structural,
    Validation,
    Credential,
    StoreWrite,
    WriteUnconfirmed,
}

/// Any failure across read, validate and ingest
#[derive(Debug, Error)]
pub enum UploadError {
    /// The uploaded file could not be decoded as tabular data
    #[error("Error reading file: {0}")]
    Parse(#[from] ParseError),

    /// A required column is missing
    #[error("{0}")]
    Structural(ValidationError),

    /// Empty key, duplicate key or non-numeric price
    #[error("{0}")]
    Validation(ValidationError),

    /// No usable write credentials
    #[error("Error: {0}")]
    Credential(#[from] CredentialError),

    /// The bulk append failed on the store side
    #[error("Error appending to BigQuery: {0}")]
    StoreWrite(StoreError),

    /// The append was accepted but its completion could not be confirmed
    #[error("Upload status unknown: {0}")]
    WriteUnconfirmed(StoreError),
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::Parse(_) => ErrorKind::Parse,
            UploadError::Structural(_) => ErrorKind::Structural,
            UploadError::Validation(_) => ErrorKind::Validation,
            UploadError::Credential(_) => ErrorKind::Credential,
            UploadError::StoreWrite(_) => ErrorKind::StoreWrite,
            UploadError::WriteUnconfirmed(_) => ErrorKind::WriteUnconfirmed,
        }
    }
}

impl From<StoreError> for UploadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::JobStatusUnknown { .. } => UploadError::WriteUnconfirmed(err),
            _ => UploadError::StoreWrite(err),
        }
    }
}

impl From<ValidationError> for UploadError {
    fn from(err: ValidationError) -> Self {
        if err.is_structural() {
            UploadError::Structural(err)
        } else {
            UploadError::Validation(err)
        }
    }
}

/// Failure decoding an uploaded file
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file type '{0}' (expected .csv, .xlsx, .xlsm, .xls or .ods)")]
    UnsupportedFormat(String),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line} has {found} fields, but the header has {expected}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("invalid workbook: {0}")]
    Workbook(String),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("no header row found")]
    NoHeader,
}

/// A dataset that breaks one of the upload rules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("c_code column cannot have empty values (rows: {})", join_rows(.rows))]
    EmptyCode { rows: Vec<usize> },

    #[error("Duplicate c_code values found: {}", .0.join(", "))]
    DuplicateCodes(Vec<String>),

    #[error(
        "Column {column} contains non-numeric values that cannot be converted (row {row}: {value:?})"
    )]
    NonNumeric {
        column: &'static str,
        row: usize,
        value: String,
    },
}

impl ValidationError {
    /// Missing columns are rejected before any row is looked at
    pub fn is_structural(&self) -> bool {
        matches!(self, ValidationError::MissingColumns(_))
    }
}

fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// No write credentials could be resolved
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CredentialError {
    /// A single source has nothing to offer; the chain moves on
    #[error("no credentials in {0}")]
    Missing(String),

    /// A source exists but its content is unusable
    #[error("invalid credentials in {source_name}: {reason}")]
    Invalid { source_name: String, reason: String },

    #[error("No credentials found for BigQuery access (tried: {})", tried.join(", "))]
    NotFound { tried: Vec<String> },
}

/// Failure reported by, or while talking to, the table store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("load job {job_id} failed: {message}")]
    Job { job_id: String, message: String },

    /// The job was submitted but its final state is unknown; it may still
    /// append every row
    #[error(
        "load job {job_id} was submitted but its status could not be read ({message}); \
         check the job in BigQuery before uploading again"
    )]
    JobStatusUnknown { job_id: String, message: String },

    #[error("failed to encode rows: {0}")]
    Encode(String),
}

/// The `(ok, message)` pair both the validator and the ingestor report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub ok: bool,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }

    /// Convert a typed result, rendering the success side with `on_ok`
    pub fn from_result<T>(result: &Result<T, UploadError>, on_ok: impl FnOnce(&T) -> String) -> Self {
        match result {
            Ok(value) => Self::success(on_ok(value)),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_are_structural() {
        let err: UploadError =
            ValidationError::MissingColumns(vec!["flash_price".to_string()]).into();
        assert_eq!(err.kind(), ErrorKind::Structural);

        let err: UploadError = ValidationError::DuplicateCodes(vec!["c-001".to_string()]).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_messages() {
        let err = ValidationError::MissingColumns(vec![
            "flash_price".to_string(),
            "speed_discount_price".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required columns: flash_price, speed_discount_price"
        );

        let err = ValidationError::EmptyCode { rows: vec![2, 5] };
        assert_eq!(
            err.to_string(),
            "c_code column cannot have empty values (rows: 2, 5)"
        );

        let err = UploadError::Credential(CredentialError::NotFound {
            tried: vec!["secrets.toml".to_string()],
        });
        assert!(err.to_string().contains("No credentials found"));
    }

    #[test]
    fn test_unconfirmed_job_is_not_a_plain_write_failure() {
        let err: UploadError = StoreError::JobStatusUnknown {
            job_id: "showroom_discount_1".to_string(),
            message: "HTTP 503: backend error".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::WriteUnconfirmed);
        let text = err.to_string();
        assert!(text.starts_with("Upload status unknown: load job showroom_discount_1"));
        assert!(!text.contains("Error appending to BigQuery"));

        let err: UploadError = StoreError::Auth("invalid_grant".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::StoreWrite);
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: Result<usize, UploadError> = Ok(3);
        let outcome = Outcome::from_result(&ok, |n| format!("{} rows", n));
        assert_eq!(outcome, Outcome::success("3 rows"));

        let err: Result<usize, UploadError> =
            Err(ValidationError::DuplicateCodes(vec!["c-001".to_string()]).into());
        let outcome = Outcome::from_result(&err, |n| format!("{} rows", n));
        assert!(!outcome.ok);
        assert_eq!(outcome.message, "Duplicate c_code values found: c-001");
    }
}
