// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Translation of raw watch events into added/modified/removed transitions.

use crate::types::{MirroredResource, ResourceSnapshot};
use kube::runtime::watcher::Event;
use std::collections::{BTreeMap, BTreeSet};

/// A change observed for one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    Added(ResourceSnapshot),
    Modified {
        old: ResourceSnapshot,
        new: ResourceSnapshot,
    },
    /// Carries the last known state of the removed resource
    Removed(ResourceSnapshot),
}

impl ResourceEvent {
    /// The snapshot the event should be reconciled against
    pub fn snapshot(&self) -> &ResourceSnapshot {
        match self {
            ResourceEvent::Added(s) | ResourceEvent::Removed(s) => s,
            ResourceEvent::Modified { new, .. } => new,
        }
    }
}

type ObjectKey = (String, String);

fn key_of(snapshot: &ResourceSnapshot) -> ObjectKey {
    (snapshot.namespace().to_string(), snapshot.name().to_string())
}

/// Last known state of every watched object of one kind.
///
/// The watcher only reports the new state of an object; this cache supplies
/// the previous one and detects objects that vanished while the watch was
/// re-listing.
#[derive(Debug, Default)]
pub struct EventCache {
    known: BTreeMap<ObjectKey, ResourceSnapshot>,
    /// Objects not yet seen again during an ongoing re-list
    unseen: Option<BTreeSet<ObjectKey>>,
}

impl EventCache {
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn apply<K: MirroredResource>(&mut self, event: Event<K>) -> Vec<ResourceEvent> {
        match event {
            Event::Apply(obj) => vec![self.upsert(obj.snapshot())],
            Event::Delete(obj) => {
                let snapshot = obj.snapshot();
                self.known.remove(&key_of(&snapshot));
                vec![ResourceEvent::Removed(snapshot)]
            }
            Event::Init => {
                self.unseen = Some(self.known.keys().cloned().collect());
                Vec::new()
            }
            Event::InitApply(obj) => {
                let snapshot = obj.snapshot();
                if let Some(unseen) = self.unseen.as_mut() {
                    unseen.remove(&key_of(&snapshot));
                }
                vec![self.upsert(snapshot)]
            }
            Event::InitDone => self
                .unseen
                .take()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|key| self.known.remove(&key))
                .map(ResourceEvent::Removed)
                .collect(),
        }
    }

    fn upsert(&mut self, snapshot: ResourceSnapshot) -> ResourceEvent {
        match self.known.insert(key_of(&snapshot), snapshot.clone()) {
            Some(old) => ResourceEvent::Modified { old, new: snapshot },
            None => ResourceEvent::Added(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::ConfigMap;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    fn make_configmap(name: &str, value: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("ns1".to_string()),
                ..Default::default()
            },
            data: Some(BTreeMap::from([("key".to_string(), value.to_string())])),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_apply_is_added_then_modified() {
        let mut cache = EventCache::default();

        let first = cache.apply(Event::Apply(make_configmap("a", "1")));
        assert!(matches!(first.as_slice(), [ResourceEvent::Added(_)]));

        let second = cache.apply(Event::Apply(make_configmap("a", "2")));
        match second.as_slice() {
            [ResourceEvent::Modified { old, new }] => {
                assert_ne!(old, new);
                assert_eq!(new.entries().get("key").unwrap().as_bytes(), b"2");
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_delete_forgets_object() {
        let mut cache = EventCache::default();
        cache.apply(Event::Apply(make_configmap("a", "1")));

        let events = cache.apply(Event::Delete(make_configmap("a", "1")));

        assert!(matches!(events.as_slice(), [ResourceEvent::Removed(_)]));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_relist_removes_vanished_objects() {
        let mut cache = EventCache::default();
        cache.apply(Event::Apply(make_configmap("kept", "1")));
        cache.apply(Event::Apply(make_configmap("gone", "1")));

        assert!(cache.apply(Event::<ConfigMap>::Init).is_empty());
        let relisted = cache.apply(Event::InitApply(make_configmap("kept", "1")));
        let done = cache.apply(Event::<ConfigMap>::InitDone);

        assert!(matches!(relisted.as_slice(), [ResourceEvent::Modified { .. }]));
        match done.as_slice() {
            [ResourceEvent::Removed(s)] => assert_eq!(s.name(), "gone"),
            other => panic!("unexpected events: {:?}", other),
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_initial_list_yields_added_events() {
        let mut cache = EventCache::default();

        cache.apply(Event::<ConfigMap>::Init);
        let events = cache.apply(Event::InitApply(make_configmap("a", "1")));
        let done = cache.apply(Event::<ConfigMap>::InitDone);

        assert!(matches!(events.as_slice(), [ResourceEvent::Added(_)]));
        assert!(done.is_empty());
    }
}
