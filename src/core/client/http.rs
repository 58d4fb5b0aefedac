//! HTTP implementation of [`BulkApi`]
//!
//! Talks to `{instance}/services/async/{version}/` using the JSON content
//! type and the `X-SFDC-Session` header.

use super::types::{BatchInfo, CreateJobRequest, JobInfo, RemoteFault};
use super::BulkApi;
use crate::auth::Session;
use crate::core::bulk::{JobSpec, Record, RecordResult};
use crate::utils::error::{BulkError, Result};
use crate::utils::net::join_url;
use crate::utils::truncate_string;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

const SESSION_HEADER: &str = "X-SFDC-Session";
const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

/// Which kind of call failed, for error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    /// Creates or changes something remotely
    Submit,
    /// Reads batch state or results
    Query,
}

/// Bulk client bound to one authenticated session
#[derive(Debug, Clone)]
pub struct ForceBulkClient {
    http: Client,
    session: Session,
    base_url: String,
}

impl ForceBulkClient {
    pub fn new(http: Client, session: Session) -> Self {
        let base_url = join_url(
            &session.instance_url,
            &format!("services/async/{}", session.api_version),
        );
        Self {
            http,
            session,
            base_url,
        }
    }

    /// Base URL of the bulk endpoints
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(SESSION_HEADER, &self.session.access_token)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_JSON)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        kind: CallKind,
        context: &str,
    ) -> Result<T> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, kind))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(e, kind))?;

        if !status.is_success() {
            return Err(map_error_response(status, &body, kind, context));
        }

        serde_json::from_str(&body).map_err(|e| {
            BulkError::Parsing(format!(
                "{}: {} (body: {})",
                context,
                e,
                truncate_string(&body, 200)
            ))
        })
    }
}

/// Transport failures on reads are retried by the poller; on writes they are surfaced as-is
fn classify_transport_error(error: reqwest::Error, kind: CallKind) -> BulkError {
    if kind == CallKind::Query && (error.is_timeout() || error.is_connect() || error.is_request()) {
        BulkError::TransientQueryFailure(error.to_string())
    } else {
        BulkError::HttpClient(error)
    }
}

/// Map a non-2xx response onto the error taxonomy
fn map_error_response(status: StatusCode, body: &str, kind: CallKind, context: &str) -> BulkError {
    let fault = serde_json::from_str::<RemoteFault>(body).ok();
    let (code, message) = match fault {
        Some(fault) => (fault.exception_code, fault.exception_message),
        None => (
            format!("HTTP_{}", status.as_u16()),
            truncate_string(body, 200),
        ),
    };

    if status == StatusCode::UNAUTHORIZED || code == "InvalidSessionId" {
        return BulkError::AuthenticationFailed(format!("{}: {}", code, message));
    }

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return BulkError::TransientQueryFailure(format!(
            "{}: HTTP {} {}: {}",
            context,
            status.as_u16(),
            code,
            message
        ));
    }

    if kind == CallKind::Query
        && (status == StatusCode::NOT_FOUND || code == "InvalidBatch" || code == "InvalidJob")
    {
        return BulkError::BatchNotFound(format!("{}: {}: {}", context, code, message));
    }

    BulkError::RemoteRejected { code, message }
}

#[async_trait]
impl BulkApi for ForceBulkClient {
    #[instrument(skip(self), fields(entity = %spec.entity_type, operation = %spec.operation))]
    async fn create_job(&self, spec: &JobSpec) -> Result<JobInfo> {
        let body = CreateJobRequest {
            operation: spec.operation,
            object: spec.entity_type.clone(),
            content_type: "JSON".to_string(),
            external_id_field_name: spec.external_id_field.clone(),
        };

        let request = self.http.post(self.url("job")).json(&body);
        let info: JobInfo = self.execute(request, CallKind::Submit, "create job").await?;
        debug!(job_id = %info.id, state = ?info.state, "Job created");
        Ok(info)
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn create_batch(&self, job_id: &str, records: &[Record]) -> Result<BatchInfo> {
        let request = self
            .http
            .post(self.url(&format!("job/{}/batch", job_id)))
            .json(records);
        let info: BatchInfo = self.execute(request, CallKind::Submit, "create batch").await?;
        debug!(batch_id = %info.id, state = %info.state, "Batch created");
        Ok(info)
    }

    async fn get_batch_state(&self, job_id: &str, batch_id: &str) -> Result<BatchInfo> {
        let request = self
            .http
            .get(self.url(&format!("job/{}/batch/{}", job_id, batch_id)));
        self.execute(request, CallKind::Query, "get batch state")
            .await
    }

    async fn get_batch_result(&self, job_id: &str, batch_id: &str) -> Result<Vec<RecordResult>> {
        let request = self
            .http
            .get(self.url(&format!("job/{}/batch/{}/result", job_id, batch_id)));
        self.execute(request, CallKind::Query, "get batch result")
            .await
    }

    #[instrument(skip(self))]
    async fn close_job(&self, job_id: &str) -> Result<JobInfo> {
        let request = self
            .http
            .post(self.url(&format!("job/{}", job_id)))
            .json(&json!({ "state": "Closed" }));
        self.execute(request, CallKind::Submit, "close job").await
    }
}
