// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Continuous watch over one resource kind.

use crate::config::NamespaceScope;
use crate::kubernetes::scoped_api;
use crate::sync::{Dispatcher, EventCache};
use crate::types::MirroredResource;
use futures::StreamExt;
use k8s_openapi::NamespaceResourceScope;
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Client, Resource};
use kube_runtime::watcher::Config as WatcherConfig;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Watches resources of kind `K` and feeds every change to the dispatcher.
///
/// Events of one kind are handled strictly one after another.
pub struct ResourceWatcher<K> {
    client: Client,
    scope: NamespaceScope,
    label_selector: String,
    dispatcher: Arc<Dispatcher>,
    _kind: PhantomData<fn() -> K>,
}

impl<K> ResourceWatcher<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + MirroredResource
        + Clone
        + DeserializeOwned
        + Debug
        + Send
        + Sync
        + 'static,
{
    pub fn new(
        client: Client,
        scope: NamespaceScope,
        label_selector: String,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            client,
            scope,
            label_selector,
            dispatcher,
            _kind: PhantomData,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            "Watching {} resources matching '{}' in namespace {}",
            K::KIND,
            self.label_selector,
            self.scope
        );

        let api = scoped_api::<K>(self.client.clone(), &self.scope);
        let config = WatcherConfig::default().labels(&self.label_selector);
        let mut cache = EventCache::default();
        let mut stream = watcher(api, config).default_backoff().boxed();

        while let Some(event) = stream.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!("Watch error for {} resources: {}", K::KIND, e);
                    continue;
                }
            };

            for change in cache.apply(event) {
                if let Err(e) = self.dispatcher.dispatch(&change).await {
                    error!("Failed to handle {}: {}", change.snapshot(), e);
                }
            }
        }

        warn!("Watch stream for {} resources ended", K::KIND);
        Ok(())
    }
}
