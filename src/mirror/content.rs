// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::URL_SUFFIX;
use crate::error::Result;
use crate::http_client::HttpClient;
use crate::types::EntryValue;
use bytes::Bytes;
use tracing::{debug, instrument};

/// Final filename and payload for one data entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub filename: String,
    pub bytes: Bytes,
}

/// Whether the entry value is a URL to fetch rather than literal content
pub fn is_remote(key: &str) -> bool {
    key.len() > URL_SUFFIX.len() && key.ends_with(URL_SUFFIX)
}

/// Filename written for `key`, independent of the entry value
pub fn output_filename(key: &str) -> &str {
    if is_remote(key) {
        &key[..key.len() - URL_SUFFIX.len()]
    } else {
        key
    }
}

/// Turns data entries into file payloads, fetching `.url` entries over HTTP
#[derive(Debug, Clone)]
pub struct ContentResolver {
    http: HttpClient,
}

impl ContentResolver {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[instrument(skip(self, value))]
    pub async fn resolve(&self, key: &str, value: &EntryValue) -> Result<ResolvedContent> {
        let filename = output_filename(key).to_string();

        let bytes = if is_remote(key) {
            let url = value.to_text();
            let url = url.trim();
            debug!("Fetching content for {} from {}", filename, url);
            self.http.get(url).await?
        } else {
            Bytes::copy_from_slice(value.as_bytes())
        };

        Ok(ResolvedContent { filename, bytes })
    }
}
