//! Router key store interface used by the RTR protocol layer
//!
//! Socket handlers and policy code depend on this trait rather than on the
//! concrete table, so a client can substitute another backing store.
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


use crate::error::SpkiResult;
use crate::record::{SourceId, SpkiRecord};
use crate::table::SpkiTable;

/// Trait for router key stores
pub trait SpkiStore: Send + Sync {
    /// Store a key announced by a cache
    fn add(&self, record: SpkiRecord) -> SpkiResult<()>;

    /// All keys for an ASN
    fn get_all(&self, asn: u32) -> Vec<SpkiRecord>;

    /// Remove a withdrawn key
    fn remove(&self, record: &SpkiRecord) -> SpkiResult<()>;

    /// Drop everything a cache announced
    fn remove_by_source(&self, source: SourceId) -> usize;

    /// Number of stored keys
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpkiStore for SpkiTable {
    fn add(&self, record: SpkiRecord) -> SpkiResult<()> {
        SpkiTable::add(self, record)
    }

    fn get_all(&self, asn: u32) -> Vec<SpkiRecord> {
        SpkiTable::get_all(self, asn)
    }

    fn remove(&self, record: &SpkiRecord) -> SpkiResult<()> {
        SpkiTable::remove(self, record)
    }

    fn remove_by_source(&self, source: SourceId) -> usize {
        SpkiTable::remove_by_source(self, source)
    }

    fn len(&self) -> usize {
        SpkiTable::len(self)
    }
}

/// Apply a Router Key PDU: announce (`withdraw == false`) or withdraw a key.
///
/// A repeated announcement is accepted silently, mirroring how caches may
/// resend keys after a reset.
pub fn apply_router_key<S: SpkiStore + ?Sized>(
    store: &S,
    record: SpkiRecord,
    withdraw: bool,
) -> SpkiResult<()> {
    if withdraw {
        return store.remove(&record);
    }
    match store.add(record) {
        Err(e) if e.is_duplicate() => Ok(()),
        other => other,
    }
}
