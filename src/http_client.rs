// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Outbound HTTP client shared by remote content fetches and the change webhook.

use crate::config::{BasicAuth, NotificationPolicy};
use crate::constants::request::RETRY_STATUSES;
use crate::error::{MirrorError, Result};
use bytes::Bytes;
use http::{header::CONTENT_TYPE, Method};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Body attached to a request together with its content type
#[derive(Debug, Clone)]
pub struct RequestBody {
    pub content: String,
    pub content_type: &'static str,
}

/// HTTP client applying the configured timeout, retries and basic auth
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    policy: NotificationPolicy,
    auth: Option<BasicAuth>,
}

impl HttpClient {
    pub fn new(policy: NotificationPolicy, auth: Option<BasicAuth>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(policy.timeout)
            .build()
            .map_err(|source| MirrorError::RequestError {
                url: String::new(),
                source,
            })?;

        Ok(Self {
            client,
            policy,
            auth,
        })
    }

    /// GET `url` and return the response body
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        self.execute(Method::GET, url, None).await
    }

    /// Send a request with an optional body, retrying transient failures
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&RequestBody>,
    ) -> Result<Bytes> {
        let mut budget = RetryBudget::new(&self.policy);

        loop {
            let failure = match self.attempt(method.clone(), url, body).await {
                Ok(bytes) => return Ok(bytes),
                Err(failure) => failure,
            };

            let Some(delay) = budget.consume(&failure) else {
                return Err(failure.into_error());
            };

            warn!(
                "{} {} failed ({}), retry {} in {:?}",
                method,
                url,
                failure.error(),
                budget.retries,
                delay
            );
            sleep(delay).await;
        }
    }

    async fn attempt(
        &self,
        method: Method,
        url: &str,
        body: Option<&RequestBody>,
    ) -> std::result::Result<Bytes, Failure> {
        let mut request = self.client.request(method, url);
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, body.content_type)
                .body(body.content.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|source| Failure::classify(url, source))?;

        let status = response.status();
        debug!("{} responded with {}", url, status);

        if RETRY_STATUSES.contains(&status.as_u16()) {
            return Err(Failure::Read(MirrorError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }
        if !status.is_success() {
            return Err(Failure::Fatal(MirrorError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        response
            .bytes()
            .await
            .map_err(|source| Failure::classify(url, source))
    }
}

/// Outcome of a failed attempt, sorted by the retry budget it draws from
#[derive(Debug)]
enum Failure {
    Connect(MirrorError),
    Read(MirrorError),
    Fatal(MirrorError),
}

impl Failure {
    fn classify(url: &str, source: reqwest::Error) -> Self {
        let is_connect = source.is_connect();
        let is_read = source.is_timeout() || source.is_body() || source.is_request();
        let error = MirrorError::RequestError {
            url: url.to_string(),
            source,
        };

        if is_connect {
            Failure::Connect(error)
        } else if is_read {
            Failure::Read(error)
        } else {
            Failure::Fatal(error)
        }
    }

    fn error(&self) -> &MirrorError {
        match self {
            Failure::Connect(e) | Failure::Read(e) | Failure::Fatal(e) => e,
        }
    }

    fn into_error(self) -> MirrorError {
        match self {
            Failure::Connect(e) | Failure::Read(e) | Failure::Fatal(e) => e,
        }
    }
}

/// Remaining retries for one logical request
#[derive(Debug)]
struct RetryBudget<'a> {
    policy: &'a NotificationPolicy,
    total: u32,
    connect: u32,
    read: u32,
    retries: u32,
}

impl<'a> RetryBudget<'a> {
    fn new(policy: &'a NotificationPolicy) -> Self {
        Self {
            policy,
            total: policy.retry_total,
            connect: policy.retry_connect,
            read: policy.retry_read,
            retries: 0,
        }
    }

    /// Spend one retry for `failure`, returning the delay before the next attempt
    fn consume(&mut self, failure: &Failure) -> Option<std::time::Duration> {
        let class = match failure {
            Failure::Connect(_) => &mut self.connect,
            Failure::Read(_) => &mut self.read,
            Failure::Fatal(_) => return None,
        };
        if self.total == 0 || *class == 0 {
            return None;
        }

        *class -= 1;
        self.total -= 1;
        self.retries += 1;
        Some(self.policy.backoff(self.retries))
    }
}
