// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Routes resource events to the reconciler and fires the change webhook.

use crate::config::NamespaceScope;
use crate::error::Result;
use crate::mirror::{Operation, Reconciler};
use crate::notify::Notifier;
use crate::sync::events::ResourceEvent;
use crate::types::ResourceSnapshot;
use tracing::{debug, info, instrument};

/// Why an event leaves the mirror untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    /// The resource lives outside the watched namespace
    OtherNamespace,
    /// Old and new states of a modified resource are identical
    Unchanged,
}

/// Action decided for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<'a> {
    Upsert(&'a ResourceSnapshot),
    Remove(&'a ResourceSnapshot),
    Noop(&'a ResourceSnapshot, NoopReason),
}

pub struct Dispatcher {
    scope: NamespaceScope,
    reconciler: Reconciler,
    notifier: Notifier,
}

impl Dispatcher {
    pub fn new(scope: NamespaceScope, reconciler: Reconciler, notifier: Notifier) -> Self {
        Self {
            scope,
            reconciler,
            notifier,
        }
    }

    /// Decide what an event means for the mirror without touching anything
    pub fn classify<'a>(&self, event: &'a ResourceEvent) -> Transition<'a> {
        let snapshot = event.snapshot();
        if !self.scope.matches(snapshot.namespace()) {
            return Transition::Noop(snapshot, NoopReason::OtherNamespace);
        }

        match event {
            ResourceEvent::Added(s) => Transition::Upsert(s),
            ResourceEvent::Modified { old, new } if old == new => {
                Transition::Noop(new, NoopReason::Unchanged)
            }
            ResourceEvent::Modified { new, .. } => Transition::Upsert(new),
            ResourceEvent::Removed(s) => Transition::Remove(s),
        }
    }

    /// Handle one event, returning whether the mirror changed.
    ///
    /// A webhook failure is returned as an error after the files have been
    /// reconciled.
    pub async fn dispatch(&self, event: &ResourceEvent) -> Result<bool> {
        match event {
            ResourceEvent::Added(s) => info!("Added {}", s),
            ResourceEvent::Modified { new, .. } => info!("Updated {}", new),
            ResourceEvent::Removed(s) => info!("Removed {}", s),
        }

        match self.classify(event) {
            Transition::Upsert(snapshot) => self.on_upsert(snapshot).await,
            Transition::Remove(snapshot) => self.on_remove(snapshot).await,
            Transition::Noop(snapshot, reason) => {
                self.on_noop(snapshot, reason);
                Ok(false)
            }
        }
    }

    #[instrument(skip(self, snapshot), fields(resource = %snapshot))]
    pub async fn on_upsert(&self, snapshot: &ResourceSnapshot) -> Result<bool> {
        let changed = self.reconciler.reconcile(snapshot, Operation::Upsert).await;
        self.notify_if_changed(changed).await
    }

    #[instrument(skip(self, snapshot), fields(resource = %snapshot))]
    pub async fn on_remove(&self, snapshot: &ResourceSnapshot) -> Result<bool> {
        let changed = self.reconciler.reconcile(snapshot, Operation::Remove).await;
        self.notify_if_changed(changed).await
    }

    pub fn on_noop(&self, snapshot: &ResourceSnapshot, reason: NoopReason) {
        match reason {
            NoopReason::OtherNamespace => {
                debug!("Ignoring {}, not in namespace {}", snapshot, self.scope)
            }
            NoopReason::Unchanged => debug!("Ignoring {}, nothing changed", snapshot),
        }
    }

    /// Upsert every listed snapshot and notify once if anything changed
    pub async fn sync_all<'a, I>(&self, snapshots: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a ResourceSnapshot>,
    {
        let mut changed = false;
        for snapshot in snapshots {
            info!("Working on {}", snapshot);
            changed |= self.reconciler.reconcile(snapshot, Operation::Upsert).await;
        }
        self.notify_if_changed(changed).await
    }

    async fn notify_if_changed(&self, changed: bool) -> Result<bool> {
        if changed {
            self.notifier.notify().await?;
        }
        Ok(changed)
    }
}
