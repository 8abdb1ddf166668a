// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as vars, request, ALL_NAMESPACES, DEFAULT_FOLDER_ANNOTATION};
use crate::types::ResourceKind;
use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// How resources are observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Keep watching until the process is stopped
    Watch,
    /// Enumerate matching resources once and exit
    List,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WATCH" => Ok(Mode::Watch),
            "LIST" => Ok(Mode::List),
            other => bail!("unknown {} '{}', expected WATCH or LIST", vars::METHOD, other),
        }
    }
}

/// Namespaces whose resources are mirrored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceScope {
    All,
    Named(String),
}

impl NamespaceScope {
    pub fn matches(&self, namespace: &str) -> bool {
        match self {
            NamespaceScope::All => true,
            NamespaceScope::Named(ns) => ns == namespace,
        }
    }
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceScope::All => f.write_str(ALL_NAMESPACES),
            NamespaceScope::Named(ns) => f.write_str(ns),
        }
    }
}

/// HTTP method used for the change webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    /// Parse a configured method; unset means GET, anything unrecognized falls back to GET
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => RequestMethod::Get,
            Some(v) if v.eq_ignore_ascii_case("GET") => RequestMethod::Get,
            Some(v) if v.eq_ignore_ascii_case("POST") => RequestMethod::Post,
            Some(v) => {
                warn!(
                    "Invalid {}: '{}', please use 'GET' or 'POST'. Falling back to GET",
                    vars::REQ_METHOD,
                    v
                );
                RequestMethod::Get
            }
        }
    }
}

/// Webhook fired after the mirrored files change
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookConfig {
    pub url: Url,
    pub method: RequestMethod,
    /// Literal body sent with POST requests
    pub payload: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Retry and timeout settings for outbound HTTP requests
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPolicy {
    pub retry_total: u32,
    pub retry_connect: u32,
    pub retry_read: u32,
    /// Seconds; the delay before retry n is `backoff_factor * 2^(n-1)`
    pub backoff_factor: f64,
    pub timeout: Duration,
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self {
            retry_total: request::RETRY_TOTAL,
            retry_connect: request::RETRY_CONNECT,
            retry_read: request::RETRY_READ,
            backoff_factor: request::RETRY_BACKOFF_FACTOR,
            timeout: Duration::from_secs(request::TIMEOUT_SECS),
        }
    }
}

impl NotificationPolicy {
    /// Delay before the given retry (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(16) as i32;
        Duration::try_from_secs_f64(self.backoff_factor * 2f64.powi(exponent)).unwrap_or(Duration::MAX)
    }
}

/// Sidecar configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub label: String,
    pub label_value: Option<String>,
    /// Default directory receiving the mirrored files
    pub folder: PathBuf,
    /// Annotation whose value overrides `folder` for a single resource
    pub folder_annotation: String,
    /// Namespace to watch; `None` means the client's default namespace
    pub namespace: Option<String>,
    pub resources: Vec<ResourceKind>,
    pub mode: Mode,
    pub unique_filenames: bool,
    pub default_file_mode: Option<u32>,
    pub webhook: Option<WebhookConfig>,
    pub auth: Option<BasicAuth>,
    pub policy: NotificationPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let label = get(vars::LABEL).context("LABEL environment variable not set")?;
        let label_value = get(vars::LABEL_VALUE);
        let folder = get(vars::FOLDER)
            .map(PathBuf::from)
            .context("FOLDER environment variable not set")?;
        let folder_annotation =
            get(vars::FOLDER_ANNOTATION).unwrap_or_else(|| DEFAULT_FOLDER_ANNOTATION.to_string());
        let namespace = get(vars::NAMESPACE);

        let resources = match get(vars::RESOURCE) {
            None => vec![ResourceKind::ConfigMap],
            Some(v) if v.trim().eq_ignore_ascii_case("both") => {
                vec![ResourceKind::ConfigMap, ResourceKind::Secret]
            }
            Some(v) => vec![v
                .parse::<ResourceKind>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {}", vars::RESOURCE))?],
        };

        let mode = match get(vars::METHOD) {
            Some(v) => v.parse()?,
            None => Mode::Watch,
        };

        let unique_filenames = get(vars::UNIQUE_FILENAMES)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        let default_file_mode = get(vars::DEFAULT_FILE_MODE)
            .map(|v| parse_file_mode(&v))
            .transpose()?;

        let webhook = match get(vars::REQ_URL) {
            Some(raw) => {
                let url = Url::parse(raw.trim())
                    .with_context(|| format!("invalid {} '{}'", vars::REQ_URL, raw))?;
                let method = RequestMethod::parse_lenient(lookup(vars::REQ_METHOD).as_deref());
                let payload = lookup(vars::REQ_PAYLOAD).unwrap_or_default();
                if method == RequestMethod::Post
                    && !payload.is_empty()
                    && serde_json::from_str::<serde_json::Value>(&payload).is_err()
                {
                    warn!("{} is not valid JSON, sending it verbatim", vars::REQ_PAYLOAD);
                }
                Some(WebhookConfig {
                    url,
                    method,
                    payload,
                })
            }
            None => None,
        };

        let auth = match (get(vars::REQ_USERNAME), get(vars::REQ_PASSWORD)) {
            (Some(username), Some(password)) => Some(BasicAuth { username, password }),
            _ => None,
        };

        let policy = NotificationPolicy {
            retry_total: parse_or(&get, vars::REQ_RETRY_TOTAL, request::RETRY_TOTAL)?,
            retry_connect: parse_or(&get, vars::REQ_RETRY_CONNECT, request::RETRY_CONNECT)?,
            retry_read: parse_or(&get, vars::REQ_RETRY_READ, request::RETRY_READ)?,
            backoff_factor: parse_or(
                &get,
                vars::REQ_RETRY_BACKOFF_FACTOR,
                request::RETRY_BACKOFF_FACTOR,
            )?,
            timeout: Duration::from_secs(parse_or(&get, vars::REQ_TIMEOUT, request::TIMEOUT_SECS)?),
        };

        if !policy.backoff_factor.is_finite() || policy.backoff_factor < 0.0 {
            bail!(
                "{} must be a non-negative number, got {}",
                vars::REQ_RETRY_BACKOFF_FACTOR,
                policy.backoff_factor
            );
        }
        if policy.timeout.is_zero() {
            bail!("{} must be greater than zero", vars::REQ_TIMEOUT);
        }

        Ok(Config {
            label,
            label_value,
            folder,
            folder_annotation,
            namespace,
            resources,
            mode,
            unique_filenames,
            default_file_mode,
            webhook,
            auth,
            policy,
        })
    }

    /// Label selector used to scope list and watch calls
    pub fn label_selector(&self) -> String {
        match &self.label_value {
            Some(value) => format!("{}={}", self.label, value),
            None => self.label.clone(),
        }
    }

    /// Resolve the namespace scope, using `fallback` when no namespace was configured
    pub fn namespace_scope(&self, fallback: &str) -> NamespaceScope {
        match self.namespace.as_deref().unwrap_or(fallback) {
            ALL_NAMESPACES => NamespaceScope::All,
            ns => NamespaceScope::Named(ns.to_string()),
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("invalid {} '{}'", key, v)),
        None => Ok(default),
    }
}

/// Parse an octal permission string such as `644` or `0o640`
fn parse_file_mode(value: &str) -> Result<u32> {
    let digits = value.trim().trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8)
        .with_context(|| format!("invalid {} '{}', expected octal", vars::DEFAULT_FILE_MODE, value))?;
    if mode > 0o7777 {
        bail!("{} '{}' is out of range", vars::DEFAULT_FILE_MODE, value);
    }
    Ok(mode)
}
