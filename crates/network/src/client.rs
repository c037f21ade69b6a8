//! REST client for the remote study API

use crate::error::{NetworkError, NetworkResult};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder};
use std::time::Duration;
use studysync_core::HttpMethod;

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the study API
    pub base_url: String,
    /// Bearer token from the external auth store
    pub bearer_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl ApiConfig {
    /// Creates a config for the given base URL with defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            timeout: Duration::from_secs(10),
            user_agent: format!("StudySync/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the bearer token
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Bearer-authenticated HTTP client for the study API
#[derive(Clone)]
pub struct ApiClient {
    inner: ReqwestClient,
    config: ApiConfig,
}

impl ApiClient {
    /// Creates a new client from the given configuration
    pub fn new(config: ApiConfig) -> NetworkResult<Self> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(NetworkError::InvalidBaseUrl(config.base_url.clone()));
        }

        let inner = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self { inner, config })
    }

    /// Fetches the remote study snapshot (`GET /study/data`)
    ///
    /// The body is returned as raw JSON; the merge engine decides what to
    /// trust in it.
    pub async fn fetch_study_data(&self) -> NetworkResult<serde_json::Value> {
        let response = self
            .authorized(self.inner.get(self.url("/study/data")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Replays a queued mutation against its original endpoint
    pub async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> NetworkResult<()> {
        let request = self
            .inner
            .request(reqwest_method(method), self.url(endpoint));
        let mut request = self.authorized(request);

        if !payload.is_null() {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}
