// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("HTTP request to {url} failed: {source}")]
    RequestError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to {url} returned status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to set mode of {}: {source}", .path.display())]
    PermissionError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove file {}: {source}", .path.display())]
    RemoveError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MirrorError>;
