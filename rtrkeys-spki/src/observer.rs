//! Update notifications for router key changes
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::record::{SourceId, SpkiRecord};
use serde::Serialize;
use tracing::info;

/// A change applied to the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SpkiEvent {
    /// A router key was stored
    Added(SpkiRecord),
    /// A router key was removed by exact match
    Removed(SpkiRecord),
    /// Every key from a source was dropped
    SourcePurged { source: SourceId, removed: usize },
}

/// Receives table changes.
///
/// Called after the table lock has been released, so implementations may
/// query the table.
///
/// Events from one thread arrive in the order that thread applied its
/// changes. Events from different threads are not ordered against each
/// other: if one thread removes a key while another re-adds it, `Added`
/// may be delivered before `Removed`. An observer that mirrors the table
/// should resynchronise from [`SpkiTable::records`](crate::SpkiTable::records)
/// rather than replay events from several writers.
pub trait SpkiObserver: Send + Sync {
    fn on_update(&self, event: &SpkiEvent);
}

/// Observer that writes every change as a structured tracing event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SpkiObserver for TracingObserver {
    fn on_update(&self, event: &SpkiEvent) {
        match event {
            SpkiEvent::Added(record) => info!(
                asn = record.asn,
                ski = %record.ski_hex(),
                source = %record.source,
                "Router key added"
            ),
            SpkiEvent::Removed(record) => info!(
                asn = record.asn,
                ski = %record.ski_hex(),
                source = %record.source,
                "Router key removed"
            ),
            SpkiEvent::SourcePurged { source, removed } => info!(
                source = %source,
                removed = removed,
                "Router keys purged for source"
            ),
        }
    }
}

impl<F> SpkiObserver for F
where
    F: Fn(&SpkiEvent) + Send + Sync,
{
    fn on_update(&self, event: &SpkiEvent) {
        self(event)
    }
}
