// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event dispatch and the watch/list run loops.

pub mod dispatcher;
pub mod events;
pub mod manager;

pub use dispatcher::{Dispatcher, NoopReason, Transition};
pub use events::{EventCache, ResourceEvent};
pub use manager::SyncManager;
