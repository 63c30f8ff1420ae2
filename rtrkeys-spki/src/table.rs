//! Thread-safe router key table
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


use crate::error::{SpkiError, SpkiResult};
use crate::index::{DualIndex, Insert};
use crate::observer::{SpkiEvent, SpkiObserver};
use crate::record::{Ski, SourceId, SpkiRecord};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Router key table shared by the RTR sockets of one client.
///
/// Every mutation holds the write lock for the whole index update. Queries
/// copy the matching records out under the read lock and return owned
/// snapshots, so callers never see table internals.
pub struct SpkiTable {
    index: RwLock<DualIndex>,
    observer: Option<Arc<dyn SpkiObserver>>,
}

impl SpkiTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            index: RwLock::new(DualIndex::new()),
            observer: None,
        }
    }

    /// Create an empty table with room for `capacity` keys.
    ///
    /// Fails with [`SpkiError::Allocation`] when the storage cannot be
    /// reserved.
    pub fn with_capacity(capacity: usize) -> SpkiResult<Self> {
        Ok(Self {
            index: RwLock::new(DualIndex::with_capacity(capacity)?),
            observer: None,
        })
    }

    /// Attach an observer that is told about every change
    pub fn with_observer(mut self, observer: Arc<dyn SpkiObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn notify(&self, event: SpkiEvent) {
        if let Some(observer) = &self.observer {
            observer.on_update(&event);
        }
    }

    /// Store a router key.
    ///
    /// Returns [`SpkiError::Duplicate`] when an exact match is already
    /// stored; the rejected record is dropped.
    pub fn add(&self, record: SpkiRecord) -> SpkiResult<()> {
        let asn = record.asn;
        let added = {
            let mut index = self.index.write();
            match index.insert(record)? {
                Insert::Inserted(handle) => Some(
                    self.observer
                        .as_ref()
                        .and_then(|_| index.get(handle).cloned()),
                ),
                Insert::Duplicate(_) => None,
            }
        };

        match added {
            Some(snapshot) => {
                debug!(asn = asn, "Router key added");
                if let Some(record) = snapshot {
                    self.notify(SpkiEvent::Added(record));
                }
                Ok(())
            }
            None => {
                debug!(asn = asn, "Duplicate router key rejected");
                Err(SpkiError::Duplicate { asn })
            }
        }
    }

    /// All router keys for `asn`, in no particular order.
    /// An empty vector means the ASN has no keys.
    pub fn get_all(&self, asn: u32) -> Vec<SpkiRecord> {
        self.index.read().find_bucket(asn).cloned().collect()
    }

    /// Remove the stored key matching `record` on ASN, SKI and SPKI.
    ///
    /// `record` is only read; the caller keeps ownership.
    pub fn remove(&self, record: &SpkiRecord) -> SpkiResult<()> {
        let removed = {
            let mut index = self.index.write();
            index.find_one(record).and_then(|handle| index.erase(handle))
        };

        match removed {
            Some(removed) => {
                debug!(asn = removed.asn, "Router key removed");
                self.notify(SpkiEvent::Removed(removed));
                Ok(())
            }
            None => {
                warn!(asn = record.asn, "Could not remove router key, not found");
                Err(SpkiError::NotFound { asn: record.asn })
            }
        }
    }

    /// Drop every key announced by `source`. Returns how many were removed;
    /// a source with no keys is not an error.
    pub fn remove_by_source(&self, source: SourceId) -> usize {
        let removed = self
            .index
            .write()
            .erase_matching(|record| record.source == source);
        let count = removed.len();
        drop(removed);

        debug!(source = %source, removed = count, "Router keys purged for source");
        self.notify(SpkiEvent::SourcePurged {
            source,
            removed: count,
        });
        count
    }

    /// All keys carrying `ski`, across every ASN
    pub fn search_by_ski(&self, ski: &Ski) -> Vec<SpkiRecord> {
        self.index
            .read()
            .iter()
            .filter(|record| &record.ski == ski)
            .cloned()
            .collect()
    }

    /// Every stored key in insertion order
    pub fn records(&self) -> Vec<SpkiRecord> {
        self.index.read().iter().cloned().collect()
    }

    /// Every key announced by `source`, in insertion order
    pub fn records_from_source(&self, source: SourceId) -> Vec<SpkiRecord> {
        self.index
            .read()
            .iter()
            .filter(|record| record.source == source)
            .cloned()
            .collect()
    }

    /// Build a new table holding every key not announced by `source`.
    ///
    /// The copy has no observer attached.
    pub fn copy_except_source(&self, source: SourceId) -> SpkiResult<SpkiTable> {
        let index = self.index.read();
        let mut copy = DualIndex::with_capacity(index.len())?;
        for record in index.iter().filter(|record| record.source != source) {
            // Source table already holds no duplicates
            copy.insert(record.clone())?;
        }
        Ok(SpkiTable {
            index: RwLock::new(copy),
            observer: None,
        })
    }

    /// Whether a key matching `record` on ASN, SKI and SPKI is stored
    pub fn contains(&self, record: &SpkiRecord) -> bool {
        self.index.read().find_one(record).is_some()
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Drop every key without notifying the observer
    pub fn clear(&self) {
        self.index.write().clear();
    }

    /// Check that hash index and ordered list agree and hold no duplicates
    pub fn check_consistency(&self) -> SpkiResult<()> {
        self.index.read().check_consistency()
    }

    /// Tear the table down, releasing every key
    pub fn free(self) {
        let remaining = self.len();
        debug!(remaining = remaining, "Releasing router key table");
        drop(self);
    }
}

impl Default for SpkiTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpkiTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpkiTable")
            .field("len", &self.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
