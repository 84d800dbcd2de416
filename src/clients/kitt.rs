use reqwest::{Client, RequestBuilder};
use std::time::Instant;

use crate::core::KittError;
use crate::domain::{FindEmailRequest, JobResponse, JobStatusQuery, VerifyEmailRequest};
use crate::infra::config::KittConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client;

/// Backend seam for the tool surface. `KittClient` is the real implementation.
#[async_trait::async_trait]
pub trait KittApi: Send + Sync + 'static {
    async fn verify_email(&self, req: &VerifyEmailRequest) -> Result<JobResponse, KittError>;
    async fn find_email(&self, req: &FindEmailRequest) -> Result<JobResponse, KittError>;
    async fn job_status(&self, query: &JobStatusQuery) -> Result<JobResponse, KittError>;
    async fn list_jobs(&self) -> Result<JobResponse, KittError>;
}

#[derive(Clone)]
pub struct KittClient {
    base: String,
    http: Client,
}

impl KittClient {
    pub fn new(base: impl Into<String>) -> Result<Self, KittError> {
        Self::from_config(&KittConfig::with_base_url(base))
    }

    pub fn from_config(cfg: &KittConfig) -> Result<Self, KittError> {
        let http = make_http_client(cfg)?;
        Ok(Self {
            base: cfg.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn verify_email_request(&self, req: &VerifyEmailRequest) -> RequestBuilder {
        self.http.post(self.url("/job/verify_email")).json(req)
    }

    fn find_email_request(&self, req: &FindEmailRequest) -> RequestBuilder {
        self.http.post(self.url("/job/find_email")).json(req)
    }

    fn job_status_request(&self, query: &JobStatusQuery) -> RequestBuilder {
        self.http.get(self.url("/job")).query(&[("id", query.id())])
    }

    fn list_jobs_request(&self) -> RequestBuilder {
        self.http.get(self.url("/job"))
    }

    fn prepare(&self, builder: RequestBuilder) -> (RequestBuilder, String) {
        add_standard_headers(builder, None)
    }

    /// Send one request and decode whatever body comes back, regardless of status.
    async fn send(&self, tool: &str, builder: RequestBuilder) -> Result<JobResponse, KittError> {
        let (builder, rid) = self.prepare(builder);
        let start = Instant::now();
        let res = self.exchange(tool, &rid, builder).await;
        if res.is_err() {
            crate::infra::logging::log_metric(tool, "remote_error_total", 1.0);
        }
        let out = res?;
        let elapsed_ms = start.elapsed().as_millis() as f64;
        crate::infra::logging::log_metric(tool, "remote_latency_ms", elapsed_ms);
        Ok(out)
    }

    async fn exchange(
        &self,
        tool: &str,
        rid: &str,
        builder: RequestBuilder,
    ) -> Result<JobResponse, KittError> {
        tracing::debug!(tool, request_id = rid, "kitt request");
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            // Upstream errors are still handed back to the caller as JSON.
            tracing::warn!(tool, request_id = rid, status = status.as_u16(), "kitt upstream non-success status");
            crate::infra::logging::log_metric(tool, "upstream_non_success_total", 1.0);
        }
        let bytes = resp.bytes().await?;
        serde_json::from_slice::<JobResponse>(&bytes).map_err(|source| KittError::Decode {
            status: status.as_u16(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl KittApi for KittClient {
    async fn verify_email(&self, req: &VerifyEmailRequest) -> Result<JobResponse, KittError> {
        self.send("verify_email_send", self.verify_email_request(req)).await
    }

    async fn find_email(&self, req: &FindEmailRequest) -> Result<JobResponse, KittError> {
        self.send("find_email", self.find_email_request(req)).await
    }

    async fn job_status(&self, query: &JobStatusQuery) -> Result<JobResponse, KittError> {
        self.send("get_job_status", self.job_status_request(query)).await
    }

    async fn list_jobs(&self) -> Result<JobResponse, KittError> {
        self.send("list_jobs", self.list_jobs_request()).await
    }
}
