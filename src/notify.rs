// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Change webhook fired after the mirrored files change.

use crate::config::{RequestMethod, WebhookConfig};
use crate::constants::JSON_CONTENT_TYPE;
use crate::error::Result;
use crate::http_client::{HttpClient, RequestBody};
use http::Method;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct Notifier {
    webhook: Option<WebhookConfig>,
    http: HttpClient,
}

impl Notifier {
    pub fn new(webhook: Option<WebhookConfig>, http: HttpClient) -> Self {
        Self { webhook, http }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook.is_some()
    }

    /// Call the configured webhook once; does nothing without a URL
    #[instrument(skip(self))]
    pub async fn notify(&self) -> Result<()> {
        let Some(webhook) = &self.webhook else {
            debug!("No webhook url configured, skipping notification");
            return Ok(());
        };

        let (method, body) = match webhook.method {
            RequestMethod::Get => (Method::GET, None),
            RequestMethod::Post => (
                Method::POST,
                Some(RequestBody {
                    content: webhook.payload.clone(),
                    content_type: JSON_CONTENT_TYPE,
                }),
            ),
        };

        self.http
            .execute(method.clone(), webhook.url.as_str(), body.as_ref())
            .await?;
        info!("Notified {} {}", method, webhook.url);
        Ok(())
    }
}
