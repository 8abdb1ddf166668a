// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One-shot enumeration of matching resources.

use crate::config::NamespaceScope;
use crate::error::Result;
use crate::kubernetes::scoped_api;
use crate::types::{MirroredResource, ResourceSnapshot};
use k8s_openapi::NamespaceResourceScope;
use kube::{api::ListParams, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{info, instrument};

/// List every `K` matching `label_selector` within `scope`
#[instrument(skip(client, scope), fields(kind = %K::KIND, namespace = %scope))]
pub async fn list_snapshots<K>(
    client: &Client,
    scope: &NamespaceScope,
    label_selector: &str,
) -> Result<Vec<ResourceSnapshot>>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + MirroredResource
        + Clone
        + DeserializeOwned
        + Debug,
{
    let api = scoped_api::<K>(client.clone(), scope);
    let list = api.list(&ListParams::default().labels(label_selector)).await?;

    info!("Found {} {} resources", list.items.len(), K::KIND);

    Ok(list.items.iter().map(MirroredResource::snapshot).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{configmap_json, configmap_list_json, MockService};
    use crate::types::ResourceKind;
    use k8s_openapi::api::core::v1::ConfigMap;

    #[tokio::test]
    async fn test_list_namespaced_configmaps() {
        let body = configmap_list_json(&[
            configmap_json("ns1", "app-cfg", &[("settings.yaml", "a: 1")]),
            configmap_json("ns1", "other", &[("b.txt", "b")]),
        ]);
        let client = MockService::new()
            .on_get("/api/v1/namespaces/ns1/configmaps", 200, &body)
            .into_client();

        let snapshots = list_snapshots::<ConfigMap>(
            &client,
            &NamespaceScope::Named("ns1".to_string()),
            "app=web",
        )
        .await
        .unwrap();

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].kind(), ResourceKind::ConfigMap);
        assert_eq!(snapshots[0].name(), "app-cfg");
    }

    #[tokio::test]
    async fn test_list_all_namespaces() {
        let body = configmap_list_json(&[configmap_json("ns2", "x", &[("k", "v")])]);
        let client = MockService::new()
            .on_get("/api/v1/configmaps", 200, &body)
            .into_client();

        let snapshots = list_snapshots::<ConfigMap>(&client, &NamespaceScope::All, "app")
            .await
            .unwrap();

        assert_eq!(snapshots[0].namespace(), "ns2");
    }

    #[tokio::test]
    async fn test_list_api_error_propagates() {
        let client = MockService::new().into_client();

        let result = list_snapshots::<ConfigMap>(
            &client,
            &NamespaceScope::Named("ns1".to_string()),
            "app",
        )
        .await;

        assert!(result.is_err());
    }
}
