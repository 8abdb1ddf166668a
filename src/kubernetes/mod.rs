// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes event sources: continuous watches and one-shot listings.

pub mod list;
pub mod watch;

pub use list::list_snapshots;
pub use watch::ResourceWatcher;

use crate::config::NamespaceScope;
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};

/// API handle for `K` limited to the namespace scope
pub fn scoped_api<K>(client: Client, scope: &NamespaceScope) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    <K as Resource>::DynamicType: Default,
{
    match scope {
        NamespaceScope::All => Api::all(client),
        NamespaceScope::Named(ns) => Api::namespaced(client, ns),
    }
}
