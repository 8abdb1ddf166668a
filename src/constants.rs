// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Annotation consulted when a resource does not name its own target directory key
pub const DEFAULT_FOLDER_ANNOTATION: &str = "k8s-sidecar-target-directory";

/// Namespace value that selects every namespace in the cluster
pub const ALL_NAMESPACES: &str = "ALL";

/// Entry keys with this suffix hold a URL whose response body becomes the file content
pub const URL_SUFFIX: &str = ".url";

/// Content type used for webhook POST bodies
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Environment variable names read by `Config::from_env`
pub mod env {
    pub const LABEL: &str = "LABEL";
    pub const LABEL_VALUE: &str = "LABEL_VALUE";
    pub const FOLDER: &str = "FOLDER";
    pub const FOLDER_ANNOTATION: &str = "FOLDER_ANNOTATION";
    pub const NAMESPACE: &str = "NAMESPACE";
    pub const RESOURCE: &str = "RESOURCE";
    pub const METHOD: &str = "METHOD";
    pub const UNIQUE_FILENAMES: &str = "UNIQUE_FILENAMES";
    pub const DEFAULT_FILE_MODE: &str = "DEFAULT_FILE_MODE";
    pub const REQ_URL: &str = "REQ_URL";
    pub const REQ_METHOD: &str = "REQ_METHOD";
    pub const REQ_PAYLOAD: &str = "REQ_PAYLOAD";
    pub const REQ_USERNAME: &str = "REQ_USERNAME";
    pub const REQ_PASSWORD: &str = "REQ_PASSWORD";
    pub const REQ_RETRY_TOTAL: &str = "REQ_RETRY_TOTAL";
    pub const REQ_RETRY_CONNECT: &str = "REQ_RETRY_CONNECT";
    pub const REQ_RETRY_READ: &str = "REQ_RETRY_READ";
    pub const REQ_RETRY_BACKOFF_FACTOR: &str = "REQ_RETRY_BACKOFF_FACTOR";
    pub const REQ_TIMEOUT: &str = "REQ_TIMEOUT";
}

/// Defaults for the outbound request policy
pub mod request {
    pub const RETRY_TOTAL: u32 = 5;
    pub const RETRY_CONNECT: u32 = 5;
    pub const RETRY_READ: u32 = 5;
    pub const RETRY_BACKOFF_FACTOR: f64 = 0.2;
    pub const TIMEOUT_SECS: u64 = 10;
    /// Response statuses treated as transient and retried
    pub const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];
}
