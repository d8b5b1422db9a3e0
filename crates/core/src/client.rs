//! FHIR REST client.
//!
//! [`FhirClient`] is the seam between the collections and the network: the
//! collections only ever see bundles and raw resources, and tests substitute
//! in-memory implementations. [`MedplumClient`] is the HTTP implementation
//! used against a Medplum (or any FHIR R4) server.

use crate::config::CoreConfig;
use crate::constants::{FHIR_JSON, RETRY_DELAY_MILLIS};
use crate::{ClientError, ClientResult, CoreError, CoreResult};
use async_trait::async_trait;
use fhir::resource::resource_type_of;
use fhir::{Bundle, CapabilityStatement, OperationOutcome, ResourceType, SearchParams};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

#[async_trait]
pub trait FhirClient: Send + Sync {
    /// `GET [base]/[type]?params`
    async fn search(&self, resource: ResourceType, params: &SearchParams) -> ClientResult<Bundle>;

    /// `GET [base]/[type]/[id]`
    async fn read(&self, resource: ResourceType, id: &str) -> ClientResult<Value>;

    /// `POST [base]/[type]`, returning the stored resource.
    async fn create(&self, resource: ResourceType, body: Value) -> ClientResult<Value>;

    /// `PUT [base]/[type]/[id]`, returning the stored resource.
    async fn update(&self, resource: ResourceType, id: &str, body: Value) -> ClientResult<Value>;

    /// `GET [base]/metadata`
    async fn capabilities(&self) -> ClientResult<CapabilityStatement>;
}

/// HTTP client for a Medplum FHIR R4 endpoint.
#[derive(Clone, Debug)]
pub struct MedplumClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    retries: u32,
    retry_delay: Duration,
}

impl MedplumClient {
    /// Build a client from the resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the underlying HTTP client cannot be built.
    pub fn new(cfg: &CoreConfig) -> CoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: cfg.base_url().to_string(),
            access_token: cfg.access_token().map(str::to_string),
            retries: cfg.retries(),
            retry_delay: Duration::from_millis(RETRY_DELAY_MILLIS),
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send a request, retrying transient failures up to the configured count.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        params: Option<&SearchParams>,
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), url, params, body).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        "{method} {url} failed ({err}); retry {attempt}/{}",
                        self.retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        params: Option<&SearchParams>,
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        tracing::debug!("{method} {url}");

        let mut request = self.http.request(method, url).header(ACCEPT, FHIR_JSON);
        if let Some(params) = params {
            request = request.query(params.pairs());
        }
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, FHIR_JSON).json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(err.to_string())
    }
}

/// The OperationOutcome summary of an error body, else the body text.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<OperationOutcome>(body)
        .ok()
        .map(|outcome| outcome.summary())
        .filter(|summary| !summary.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().chars().take(200).collect())
}

#[async_trait]
impl FhirClient for MedplumClient {
    async fn search(&self, resource: ResourceType, params: &SearchParams) -> ClientResult<Bundle> {
        let url = self.url(resource.as_str());
        let value = self.execute(Method::GET, &url, Some(params), None).await?;

        match resource_type_of(&value) {
            Some("Bundle") => {}
            other => {
                return Err(ClientError::Decode(format!(
                    "search returned {} instead of a Bundle",
                    other.unwrap_or("no resourceType")
                )))
            }
        }
        serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn read(&self, resource: ResourceType, id: &str) -> ClientResult<Value> {
        let url = self.url(&format!("{resource}/{id}"));
        self.execute(Method::GET, &url, None, None).await
    }

    async fn create(&self, resource: ResourceType, body: Value) -> ClientResult<Value> {
        let url = self.url(resource.as_str());
        self.execute(Method::POST, &url, None, Some(&body)).await
    }

    async fn update(&self, resource: ResourceType, id: &str, body: Value) -> ClientResult<Value> {
        let url = self.url(&format!("{resource}/{id}"));
        self.execute(Method::PUT, &url, None, Some(&body)).await
    }

    async fn capabilities(&self) -> ClientResult<CapabilityStatement> {
        let url = self.url("metadata");
        let value = self.execute(Method::GET, &url, None, None).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
