// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runs the configured watch loops or the one-shot listing.

use crate::config::{Config, Mode, NamespaceScope};
use crate::http_client::HttpClient;
use crate::kubernetes::{list_snapshots, ResourceWatcher};
use crate::mirror::Reconciler;
use crate::notify::Notifier;
use crate::sync::Dispatcher;
use crate::types::ResourceKind;
use futures::future::try_join_all;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::Client;
use std::sync::Arc;
use tracing::{error, info};

pub struct SyncManager {
    client: Client,
    config: Config,
    scope: NamespaceScope,
    dispatcher: Arc<Dispatcher>,
}

impl SyncManager {
    pub fn new(client: Client, config: Config) -> anyhow::Result<Self> {
        let scope = config.namespace_scope(client.default_namespace());
        let http = HttpClient::new(config.policy.clone(), config.auth.clone())?;
        let reconciler = Reconciler::from_config(&config, http.clone());
        let notifier = Notifier::new(config.webhook.clone(), http);
        let dispatcher = Arc::new(Dispatcher::new(scope.clone(), reconciler, notifier));

        Ok(Self {
            client,
            config,
            scope,
            dispatcher,
        })
    }

    pub fn scope(&self) -> &NamespaceScope {
        &self.scope
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match self.config.mode {
            Mode::Watch => self.watch().await,
            Mode::List => self.list().await,
        }
    }

    /// Spawn one watch task per selected kind and wait until they all end
    async fn watch(self) -> anyhow::Result<()> {
        let selector = self.config.label_selector();
        let tasks: Vec<_> = self
            .config
            .resources
            .iter()
            .map(|kind| match kind {
                ResourceKind::ConfigMap => tokio::spawn(
                    ResourceWatcher::<ConfigMap>::new(
                        self.client.clone(),
                        self.scope.clone(),
                        selector.clone(),
                        self.dispatcher.clone(),
                    )
                    .run(),
                ),
                ResourceKind::Secret => tokio::spawn(
                    ResourceWatcher::<Secret>::new(
                        self.client.clone(),
                        self.scope.clone(),
                        selector.clone(),
                        self.dispatcher.clone(),
                    )
                    .run(),
                ),
            })
            .collect();

        for result in try_join_all(tasks).await? {
            result?;
        }
        Ok(())
    }

    /// Mirror every matching resource once, notifying at most once
    async fn list(self) -> anyhow::Result<()> {
        let selector = self.config.label_selector();
        let mut snapshots = Vec::new();

        for kind in &self.config.resources {
            let listed = match kind {
                ResourceKind::ConfigMap => {
                    list_snapshots::<ConfigMap>(&self.client, &self.scope, &selector).await
                }
                ResourceKind::Secret => {
                    list_snapshots::<Secret>(&self.client, &self.scope, &selector).await
                }
            };
            match listed {
                Ok(mut found) => snapshots.append(&mut found),
                Err(e) => error!("Failed to list {} resources: {}", kind, e),
            }
        }

        let changed = self.dispatcher.sync_all(&snapshots).await?;
        info!(
            "Listed {} resources, files {}",
            snapshots.len(),
            if changed { "changed" } else { "unchanged" }
        );
        Ok(())
    }
}
