// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Kind of cluster resource whose data is mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    ConfigMap,
    Secret,
}

impl ResourceKind {
    /// Lowercase name used in unique filenames and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ConfigMap => "configmap",
            ResourceKind::Secret => "secret",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "configmap" => Ok(ResourceKind::ConfigMap),
            "secret" => Ok(ResourceKind::Secret),
            other => Err(format!("unknown resource kind '{}'", other)),
        }
    }
}

/// Raw value of one data entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    Text(String),
    Binary(Vec<u8>),
}

impl EntryValue {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EntryValue::Text(s) => s.as_bytes(),
            EntryValue::Binary(b) => b,
        }
    }

    /// Value interpreted as text, replacing invalid UTF-8 in binary values
    pub fn to_text(&self) -> String {
        match self {
            EntryValue::Text(s) => s.clone(),
            EntryValue::Binary(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

/// Point-in-time capture of a ConfigMap or Secret.
///
/// Identity is `(kind, namespace, name)`. A snapshot is never mutated; every
/// observed event produces a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSnapshot {
    kind: ResourceKind,
    namespace: String,
    name: String,
    annotations: BTreeMap<String, String>,
    entries: BTreeMap<String, EntryValue>,
}

impl ResourceSnapshot {
    /// Build a snapshot, dropping entries with an empty key
    pub fn new(
        kind: ResourceKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
        annotations: BTreeMap<String, String>,
        entries: BTreeMap<String, EntryValue>,
    ) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let entries = entries
            .into_iter()
            .filter(|(key, _)| {
                if key.is_empty() {
                    warn!("Ignoring entry with empty key in {} {}/{}", kind, namespace, name);
                }
                !key.is_empty()
            })
            .collect();

        Self {
            kind,
            namespace,
            name,
            annotations,
            entries,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    pub fn entries(&self) -> &BTreeMap<String, EntryValue> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ResourceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// Cluster objects that can be captured as a `ResourceSnapshot`
pub trait MirroredResource {
    const KIND: ResourceKind;

    fn snapshot(&self) -> ResourceSnapshot;
}

impl MirroredResource for ConfigMap {
    const KIND: ResourceKind = ResourceKind::ConfigMap;

    fn snapshot(&self) -> ResourceSnapshot {
        let text = self
            .data
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), EntryValue::Text(v.clone())));
        let binary = self
            .binary_data
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), EntryValue::Binary(v.0.clone())));

        ResourceSnapshot::new(
            Self::KIND,
            self.namespace().unwrap_or_default(),
            self.name_any(),
            self.annotations().clone(),
            text.chain(binary).collect(),
        )
    }
}

impl MirroredResource for Secret {
    const KIND: ResourceKind = ResourceKind::Secret;

    fn snapshot(&self) -> ResourceSnapshot {
        let entries = self
            .data
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), EntryValue::Binary(v.0.clone())))
            .collect();

        ResourceSnapshot::new(
            Self::KIND,
            self.namespace().unwrap_or_default(),
            self.name_any(),
            self.annotations().clone(),
            entries,
        )
    }
}
