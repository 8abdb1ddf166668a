// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource data model shared by the event sources and the mirror.

pub mod snapshot;

pub use snapshot::{EntryValue, MirroredResource, ResourceKind, ResourceSnapshot};
