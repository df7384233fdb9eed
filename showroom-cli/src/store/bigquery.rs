//! BigQuery table store
//!
//! An append is a single load job: the job configuration and the rows (as
//! newline-delimited JSON) go up in one multipart request, then the job is
//! polled until BigQuery reports it done. Polling only reads job status; the
//! rows are sent exactly once.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::auth::{AccessToken, TokenExchanger};
use super::credentials::ServiceAccountKey;
use super::models::TableRef;
use super::{StoreConnector, TableStore};
use crate::discount::{DiscountRecord, TableSchema};
use crate::error::StoreError;

pub const DEFAULT_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";
pub const DEFAULT_UPLOAD_BASE: &str = "https://bigquery.googleapis.com/upload/bigquery/v2";

/// Connection settings for the BigQuery REST API
#[derive(Debug, Clone)]
pub struct BigQuerySettings {
    pub api_base: String,
    pub upload_base: String,
    /// Replaces the token endpoint named in the key
    pub token_uri: Option<String>,
    /// Dataset location (e.g. "US", "asia-southeast2"); BigQuery infers it when unset
    pub location: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for BigQuerySettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
            token_uri: None,
            location: None,
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(300),
        }
    }
}

/// Opens authenticated [`BigQueryStore`] handles
#[derive(Debug, Clone)]
pub struct BigQueryConnector {
    http: reqwest::Client,
    exchanger: TokenExchanger,
    settings: BigQuerySettings,
}

impl BigQueryConnector {
    pub fn new(settings: BigQuerySettings) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        let exchanger = TokenExchanger::new(http.clone(), settings.token_uri.clone());

        Ok(Self {
            http,
            exchanger,
            settings,
        })
    }
}

#[async_trait]
impl StoreConnector for BigQueryConnector {
    async fn connect(&self, key: &ServiceAccountKey) -> Result<Box<dyn TableStore>, StoreError> {
        let token = self.exchanger.exchange(key).await?;
        debug!("Access token valid until {}", token.expires_at);

        Ok(Box::new(BigQueryStore {
            http: self.http.clone(),
            token,
            settings: self.settings.clone(),
        }))
    }
}

/// Authenticated handle to the BigQuery API
pub struct BigQueryStore {
    http: reqwest::Client,
    token: AccessToken,
    settings: BigQuerySettings,
}

#[async_trait]
impl TableStore for BigQueryStore {
    async fn append(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        records: &[DiscountRecord],
    ) -> Result<u64, StoreError> {
        let job_id = new_job_id();
        let job_config = build_load_job(table, schema, &job_id, self.settings.location.as_deref());
        let rows = encode_rows(records)?;
        let boundary = format!("showroom_{}", Uuid::new_v4().simple());
        let body = multipart_body(&boundary, &job_config, &rows);

        let url = format!(
            "{}/projects/{}/jobs?uploadType=multipart",
            self.settings.upload_base,
            urlencoding::encode(&table.project_id)
        );

        info!("Starting load job {} into {} ({} rows)", job_id, table, records.len());
        let sent = self
            .http
            .post(&url)
            .bearer_auth(&self.token.token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            // The request may have reached BigQuery before the client gave up
            Err(err) if err.is_timeout() => return Err(status_unknown(&job_id, err.into())),
            Err(err) => return Err(err.into()),
        };

        let mut job: Job = read_json(response).await?;

        loop {
            if let Some(result) = job_result(&job, records.len() as u64) {
                return result;
            }
            debug!("Load job {} is {}", job_id, job.state());
            tokio::time::sleep(self.settings.poll_interval).await;
            job = match self.get_job(&table.project_id, &job.job_reference).await {
                Ok(job) => job,
                Err(err) => return Err(status_unknown(&job_id, err)),
            };
        }
    }
}

impl BigQueryStore {
    async fn get_job(&self, project_id: &str, reference: &JobReference) -> Result<Job, StoreError> {
        let mut url = format!(
            "{}/projects/{}/jobs/{}",
            self.settings.api_base,
            urlencoding::encode(project_id),
            urlencoding::encode(&reference.job_id)
        );
        if let Some(location) = reference.location.as_ref().or(self.settings.location.as_ref()) {
            url.push_str(&format!("?location={}", urlencoding::encode(location)));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token.token)
            .send()
            .await?;
        read_json(response).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    job_reference: JobReference,
    #[serde(default)]
    status: Option<JobStatus>,
    #[serde(default)]
    statistics: Option<JobStatistics>,
}

impl Job {
    fn state(&self) -> &str {
        self.status.as_ref().map(|s| s.state.as_str()).unwrap_or("PENDING")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    state: String,
    #[serde(default)]
    error_result: Option<ErrorProto>,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorProto {
    fn text(&self) -> String {
        match (&self.reason, &self.message) {
            (Some(reason), Some(message)) => format!("{} ({})", message, reason),
            (None, Some(message)) => message.clone(),
            (Some(reason), None) => reason.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobStatistics {
    #[serde(default)]
    load: Option<LoadStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadStatistics {
    /// int64 values come back as JSON strings
    #[serde(default)]
    output_rows: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Once a job is accepted, a failed status read says nothing about the rows
fn status_unknown(job_id: &str, err: StoreError) -> StoreError {
    warn!("Lost track of load job {}: {}", job_id, err);
    StoreError::JobStatusUnknown {
        job_id: job_id.to_string(),
        message: err.to_string(),
    }
}

fn new_job_id() -> String {
    format!("showroom_discount_{}", Uuid::new_v4().simple())
}

/// Load job resource: append-only, never creates the table
fn build_load_job(
    table: &TableRef,
    schema: &TableSchema,
    job_id: &str,
    location: Option<&str>,
) -> Value {
    let mut reference = json!({
        "projectId": table.project_id,
        "jobId": job_id,
    });
    if let Some(location) = location {
        reference["location"] = json!(location);
    }

    json!({
        "jobReference": reference,
        "configuration": {
            "load": {
                "destinationTable": table,
                "schema": schema,
                "sourceFormat": "NEWLINE_DELIMITED_JSON",
                "writeDisposition": "WRITE_APPEND",
                "createDisposition": "CREATE_NEVER",
            }
        }
    })
}

/// One JSON object per line, nulls kept explicit
fn encode_rows(records: &[DiscountRecord]) -> Result<String, StoreError> {
    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| StoreError::Encode(e.to_string()))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

fn multipart_body(boundary: &str, job_config: &Value, rows: &str) -> String {
    format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n\
         --{b}\r\nContent-Type: application/octet-stream\r\n\r\n{rows}\r\n\
         --{b}--\r\n",
        b = boundary,
        meta = job_config,
        rows = rows,
    )
}

/// `None` while the job is still running
fn job_result(job: &Job, sent_rows: u64) -> Option<Result<u64, StoreError>> {
    let status = job.status.as_ref()?;
    if status.state != "DONE" {
        return None;
    }

    if let Some(error) = &status.error_result {
        let first = error.text();
        let mut messages: Vec<String> = status
            .errors
            .iter()
            .map(ErrorProto::text)
            .filter(|m| m != &first)
            .take(5)
            .collect();
        messages.insert(0, first);
        return Some(Err(StoreError::Job {
            job_id: job.job_reference.job_id.clone(),
            message: messages.join("; "),
        }));
    }

    let written = job
        .statistics
        .as_ref()
        .and_then(|s| s.load.as_ref())
        .and_then(|l| l.output_rows.as_deref())
        .and_then(|n| n.parse::<u64>().ok());

    match written {
        Some(n) if n != sent_rows => {
            warn!("Load job wrote {} rows, {} were sent", n, sent_rows);
            Some(Ok(n))
        }
        Some(n) => Some(Ok(n)),
        None => Some(Ok(sent_rows)),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(StoreError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| StoreError::Api {
        status: status.as_u16(),
        message: format!("unexpected response: {}", e),
    })
}
