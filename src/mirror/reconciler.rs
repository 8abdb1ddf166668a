// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Makes the on-disk files match one resource snapshot.

use crate::config::Config;
use crate::error::Result;
use crate::http_client::HttpClient;
use crate::mirror::content::{output_filename, ContentResolver};
use crate::mirror::naming::{DestinationDirective, NamePolicy};
use crate::mirror::store::FileStore;
use crate::types::{EntryValue, ResourceSnapshot};
use std::fmt;
use std::path::Path;
use tracing::{debug, error, instrument};

/// What to do with the files of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upsert,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Upsert => f.write_str("upsert"),
            Operation::Remove => f.write_str("remove"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    resolver: ContentResolver,
    names: NamePolicy,
    store: FileStore,
}

impl Reconciler {
    pub fn new(resolver: ContentResolver, names: NamePolicy, store: FileStore) -> Self {
        Self {
            resolver,
            names,
            store,
        }
    }

    pub fn from_config(config: &Config, http: HttpClient) -> Self {
        Self::new(
            ContentResolver::new(http),
            NamePolicy {
                default_directory: config.folder.clone(),
                override_annotation: config.folder_annotation.clone(),
                unique_filenames: config.unique_filenames,
            },
            FileStore::new(config.default_file_mode),
        )
    }

    /// Apply `operation` to every entry of `snapshot`.
    ///
    /// Returns true if any file was written or removed. Entries that fail are
    /// logged and skipped.
    #[instrument(skip(self, snapshot), fields(resource = %snapshot))]
    pub async fn reconcile(&self, snapshot: &ResourceSnapshot, operation: Operation) -> bool {
        if snapshot.is_empty() {
            debug!("No data/binaryData field in {}, nothing to do", snapshot);
            return false;
        }

        let directory = self.names.directory(snapshot);
        let mut changed = false;

        for (key, value) in snapshot.entries() {
            let result = match operation {
                Operation::Upsert => self.upsert_entry(snapshot, &directory, key, value).await,
                Operation::Remove => self.remove_entry(snapshot, &directory, key).await,
            };

            match result {
                Ok(entry_changed) => changed |= entry_changed,
                Err(e) => error!("Skipping {} of {} ({}): {}", key, snapshot, operation, e),
            }
        }

        changed
    }

    async fn upsert_entry(
        &self,
        snapshot: &ResourceSnapshot,
        directory: &Path,
        key: &str,
        value: &EntryValue,
    ) -> Result<bool> {
        let content = self.resolver.resolve(key, value).await?;
        let directive = DestinationDirective {
            directory: directory.to_path_buf(),
            filename: self.names.filename(snapshot, &content.filename),
        };
        self.store
            .put(&directive.directory, &directive.filename, &content.bytes)
            .await
    }

    async fn remove_entry(
        &self,
        snapshot: &ResourceSnapshot,
        directory: &Path,
        key: &str,
    ) -> Result<bool> {
        let filename = self.names.filename(snapshot, output_filename(key));
        self.store.remove(directory, &filename).await
    }
}
