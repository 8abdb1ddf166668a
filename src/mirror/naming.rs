// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::{ResourceKind, ResourceSnapshot};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolved target of one data entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationDirective {
    pub directory: PathBuf,
    pub filename: String,
}

impl DestinationDirective {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Directory from the override annotation when set and non-empty, else `default`
pub fn resolve_directory(
    annotations: &BTreeMap<String, String>,
    default: &Path,
    override_key: &str,
) -> PathBuf {
    annotations
        .get(override_key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| default.to_path_buf())
}

/// Filename for an entry, prefixed with the resource identity when `unique` is set
pub fn resolve_filename(
    base: &str,
    namespace: &str,
    kind: ResourceKind,
    name: &str,
    unique: bool,
) -> String {
    if unique {
        format!("namespace_{}.{}_{}.{}", namespace, kind, name, base)
    } else {
        base.to_string()
    }
}

/// Naming settings fixed at startup
#[derive(Debug, Clone)]
pub struct NamePolicy {
    pub default_directory: PathBuf,
    pub override_annotation: String,
    pub unique_filenames: bool,
}

impl NamePolicy {
    pub fn directory(&self, snapshot: &ResourceSnapshot) -> PathBuf {
        let directory = resolve_directory(
            snapshot.annotations(),
            &self.default_directory,
            &self.override_annotation,
        );
        if directory != self.default_directory {
            info!(
                "Found a folder override annotation, placing {} in: {}",
                snapshot,
                directory.display()
            );
        }
        directory
    }

    pub fn filename(&self, snapshot: &ResourceSnapshot, base: &str) -> String {
        resolve_filename(
            base,
            snapshot.namespace(),
            snapshot.kind(),
            snapshot.name(),
            self.unique_filenames,
        )
    }
}
