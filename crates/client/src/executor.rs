// crates/client/src/executor.rs
//! Resilient request execution: deadline, classification, retry.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// One logical API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    idempotency_key: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            idempotency_key: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| Error::InvalidRequest {
            message: format!("request body could not be encoded: {e}"),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn idempotency_key(mut self, key: Option<String>) -> Self {
        self.idempotency_key = key;
        self
    }

    /// GET requests and anything carrying an idempotency key may be retried.
    pub fn is_idempotent(&self) -> bool {
        self.method == Method::GET || self.idempotency_key.is_some()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reject requests reqwest would refuse to build, before any attempt.
    fn check(&self) -> Result<()> {
        if let Some(key) = &self.idempotency_key {
            if HeaderValue::from_str(key).is_err() {
                return Err(Error::InvalidRequest {
                    message: format!("idempotency key {key:?} is not a valid header value"),
                });
            }
        }
        Ok(())
    }
}

/// Percent-encode one path segment.
pub(crate) fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

/// Executes [`ApiRequest`]s against the tracking service.
///
/// Holds no mutable state; share it behind an `Arc`.
#[derive(Debug)]
pub struct RequestExecutor {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RequestExecutor {
    /// Validate `config` and build the pooled HTTP client. No network call
    /// is made here.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| {
            Error::Config("API key contains characters not allowed in a header".into())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            retry: config.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run `request`, retrying idempotent calls on retryable failures.
    ///
    /// When every attempt fails the last classified error is returned as is.
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        request.check()?;
        let attempts = self.retry.attempts_for(request.is_idempotent());
        let mut attempt = 0;

        loop {
            match self.send_once(request).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt + 1 < attempts && err.is_retryable() => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(key) = &request.idempotency_key {
            builder = builder.header(IDEMPOTENCY_HEADER, key);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, headers, body))
        };

        let (status, headers, body) = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(parts)) => parts,
            Ok(Err(e)) => return Err(Error::from_transport(e, self.timeout)),
            Err(_) => return Err(Error::Timeout { after: self.timeout }),
        };

        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "Request completed"
        );

        if !status.is_success() {
            return Err(Error::from_response(status, &headers, &body));
        }
        decode(status, &body)
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| Error::InvalidResponse {
        message: format!("HTTP {} body did not match the expected shape: {e}", status.as_u16()),
    })
}
