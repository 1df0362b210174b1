use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use triage_core::config::{ApiSettings, Config, Endpoints};
use triage_core::{Failure, Gateway, GatewayResult, OverdueSubmission, StagedFile, StudentId, TaskId};

use crate::error::ClientError;
use crate::response::{classify, transport_failure};
use crate::types::NotifyRequest;

pub const LOAD_FALLBACK: &str = "Failed to load overdue submissions";
pub const NOTIFY_FALLBACK: &str = "Failed to send notification";
pub const UPLOAD_FALLBACK: &str = "Failed to upload submission";

// ─── HttpGateway ──────────────────────────────────────────────────────────

/// [`Gateway`] backed by the LMS REST API.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    endpoints: Endpoints,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(api: &ApiSettings, endpoints: &Endpoints) -> Result<Self, ClientError> {
        let base = api.base_url.trim();
        Url::parse(base).map_err(|e| ClientError::InvalidBaseUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder().user_agent(concat!("triage/", env!("CARGO_PKG_VERSION")));
        if api.request_timeout_secs > 0 {
            builder = builder.timeout(api.request_timeout());
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base.trim_end_matches('/').to_string(),
            endpoints: endpoints.clone(),
            token: api.resolved_token(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(&config.api, &config.endpoints)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send `request` and classify the response.
    async fn execute<T: DeserializeOwned>(
        &self,
        op: &'static str,
        request: RequestBuilder,
        fallback: &'static str,
    ) -> GatewayResult<Option<T>> {
        let response = match self.authorized(request).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(op, error = %e, "request did not reach the API");
                return Err(transport_failure(&e, fallback));
            }
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(op, %status, error = %e, "failed to read response body");
                return Err(transport_failure(&e, fallback));
            }
        };

        let result = classify(status, &body, fallback);
        match &result {
            Ok(_) => tracing::debug!(op, %status, "API call succeeded"),
            Err(failure) => tracing::warn!(op, %status, error = %failure, "API call failed"),
        }
        result
    }

    async fn fetch_snapshot(&self) -> GatewayResult<Vec<OverdueSubmission>> {
        let url = self.url(&self.endpoints.overdue_submissions);
        tracing::debug!(%url, "loading overdue submissions");
        self.execute("load", self.client.get(url), LOAD_FALLBACK)
            .await?
            .ok_or_else(|| {
                tracing::warn!("overdue snapshot response had no data");
                Failure::Unknown(LOAD_FALLBACK.to_string())
            })
    }

    async fn send_notify(&self, student_id: StudentId, task_id: TaskId) -> GatewayResult<()> {
        let url = self.url(&self.endpoints.notify);
        tracing::debug!(%url, student_id, task_id, "posting overdue notification");
        let request = self
            .client
            .post(url)
            .json(&NotifyRequest {
                student_id,
                task_id,
            });
        self.execute::<serde_json::Value>("notify", request, NOTIFY_FALLBACK)
            .await
            .map(|_| ())
    }

    async fn send_upload(
        &self,
        student_id: StudentId,
        task_id: TaskId,
        file: StagedFile,
    ) -> GatewayResult<()> {
        if file.bytes.is_empty() {
            return Err(Failure::Validation(format!(
                "{UPLOAD_FALLBACK}: '{}' is empty",
                file.file_name
            )));
        }

        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type).map_err(|_| {
                Failure::Validation(format!("{UPLOAD_FALLBACK}: invalid content type '{content_type}'"))
            })?;
        }
        let form = Form::new()
            .text("student_id", student_id.to_string())
            .part("file", part);

        let url = self.url(&self.endpoints.upload_for(task_id));
        tracing::debug!(%url, student_id, file = %file.file_name, size = file.size(), "uploading submission");
        self.execute::<serde_json::Value>("upload", self.client.post(url).multipart(form), UPLOAD_FALLBACK)
            .await
            .map(|_| ())
    }
}

impl Gateway for HttpGateway {
    fn load_overdue_submissions(&self) -> BoxFuture<'_, GatewayResult<Vec<OverdueSubmission>>> {
        self.fetch_snapshot().boxed()
    }

    fn notify(&self, student_id: StudentId, task_id: TaskId) -> BoxFuture<'_, GatewayResult<()>> {
        self.send_notify(student_id, task_id).boxed()
    }

    fn upload_on_behalf(
        &self,
        student_id: StudentId,
        task_id: TaskId,
        file: StagedFile,
    ) -> BoxFuture<'_, GatewayResult<()>> {
        self.send_upload(student_id, task_id, file).boxed()
    }
}
