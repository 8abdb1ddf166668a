// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource-to-file reconciliation: naming, content resolution and filesystem effects.

pub mod content;
pub mod naming;
pub mod reconciler;
pub mod store;

pub use content::{ContentResolver, ResolvedContent};
pub use naming::{DestinationDirective, NamePolicy};
pub use reconciler::{Operation, Reconciler};
pub use store::FileStore;
