//! Dual index over router key records
//!
//! Records live in a slot arena. Two structures refer to them by slot
//! handle: a hash index from ASN to the handles in that ASN's bucket, and a
//! doubly linked list threading every live slot in insertion order. Every
//! mutation updates both before returning, so a handle is either in both
//! or in neither.
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


use crate::compare::{asn_match, exact_match};
use crate::error::{SpkiError, SpkiResult};
use crate::record::SpkiRecord;
use std::collections::HashMap;

/// Position of a record in the slot arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Handle(usize);

/// Outcome of [`DualIndex::insert`]
#[derive(Debug)]
pub(crate) enum Insert {
    Inserted(Handle),
    /// An exact match is already stored; the rejected record is handed back
    Duplicate(SpkiRecord),
}

struct Slot {
    record: SpkiRecord,
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// Hash index by ASN plus insertion-ordered list over one record arena
#[derive(Default)]
pub(crate) struct DualIndex {
    slots: Vec<Option<Slot>>,
    free: Vec<Handle>,
    buckets: HashMap<u32, Vec<Handle>>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
    #[cfg(test)]
    fail_bucket_reserve: bool,
}

impl DualIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty index with room for `capacity` records.
    ///
    /// The capacity usually comes from configuration, so an impossible size
    /// is reported as [`SpkiError::Allocation`].
    pub fn with_capacity(capacity: usize) -> SpkiResult<Self> {
        let mut index = Self::default();
        index.slots.try_reserve(capacity)?;
        index.free.try_reserve(capacity)?;
        index.buckets.try_reserve(capacity)?;
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(&self, handle: Handle) -> Option<&Slot> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, handle: Handle) -> Option<&mut Slot> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Record stored at `handle`, if the slot is live
    pub fn get(&self, handle: Handle) -> Option<&SpkiRecord> {
        self.slot(handle).map(|slot| &slot.record)
    }

    /// Insert a record into both structures.
    ///
    /// All storage growth is reserved before anything is linked, so an
    /// allocation failure returns an error with the index untouched.
    pub fn insert(&mut self, record: SpkiRecord) -> SpkiResult<Insert> {
        if self.find_one(&record).is_some() {
            return Ok(Insert::Duplicate(record));
        }

        let reuse = self.free.pop();
        if let Err(e) = self.reserve_for(record.asn, reuse.is_none()) {
            if let Some(handle) = reuse {
                self.free.push(handle);
            }
            return Err(e);
        }

        let handle = reuse.unwrap_or(Handle(self.slots.len()));
        let slot = Slot {
            record,
            prev: self.tail,
            next: None,
        };
        let asn = slot.record.asn;

        if handle.0 == self.slots.len() {
            self.slots.push(Some(slot));
        } else {
            self.slots[handle.0] = Some(slot);
        }

        match self.tail {
            Some(tail) => {
                if let Some(prev) = self.slot_mut(tail) {
                    prev.next = Some(handle);
                }
            }
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);

        self.buckets.entry(asn).or_default().push(handle);
        self.len += 1;

        Ok(Insert::Inserted(handle))
    }

    fn reserve_for(&mut self, asn: u32, new_slot: bool) -> SpkiResult<()> {
        if new_slot {
            self.slots.try_reserve(1)?;
            // The free list can absorb every slot, so erase never allocates
            let wanted = (self.slots.len() + 1).saturating_sub(self.free.len());
            self.free.try_reserve(wanted)?;
        }
        #[cfg(test)]
        if self.fail_bucket_reserve {
            return Err(SpkiError::Allocation("bucket reservation refused".into()));
        }
        match self.buckets.get_mut(&asn) {
            Some(bucket) => bucket.try_reserve(1)?,
            None => {
                self.buckets.try_reserve(1)?;
                let mut bucket = Vec::new();
                bucket.try_reserve(1)?;
                self.buckets.insert(asn, bucket);
            }
        }
        Ok(())
    }

    /// Exact-match lookup within the bucket for `record.asn`
    pub fn find_one(&self, record: &SpkiRecord) -> Option<Handle> {
        self.buckets.get(&record.asn)?.iter().copied().find(|&handle| {
            self.get(handle)
                .map_or(false, |stored| exact_match(stored, record))
        })
    }

    /// Every record bound to `asn`
    pub fn find_bucket(&self, asn: u32) -> impl Iterator<Item = &SpkiRecord> + '_ {
        self.buckets
            .get(&asn)
            .into_iter()
            .flatten()
            .filter_map(move |&handle| self.get(handle))
            .filter(move |record| asn_match(asn, record))
    }

    /// Unlink a record from list and bucket and release its slot
    pub fn erase(&mut self, handle: Handle) -> Option<SpkiRecord> {
        let slot = self.slots.get_mut(handle.0)?.take()?;

        match slot.prev {
            Some(prev) => {
                if let Some(p) = self.slot_mut(prev) {
                    p.next = slot.next;
                }
            }
            None => self.head = slot.next,
        }
        match slot.next {
            Some(next) => {
                if let Some(n) = self.slot_mut(next) {
                    n.prev = slot.prev;
                }
            }
            None => self.tail = slot.prev,
        }

        let asn = slot.record.asn;
        if let Some(bucket) = self.buckets.get_mut(&asn) {
            if let Some(pos) = bucket.iter().position(|&h| h == handle) {
                bucket.swap_remove(pos);
            }
            if bucket.is_empty() {
                self.buckets.remove(&asn);
            }
        }

        self.free.push(handle);
        self.len -= 1;
        Some(slot.record)
    }

    /// Scan the list once, then erase every record the predicate selects.
    /// Removed records are returned in insertion order.
    pub fn erase_matching<F>(&mut self, mut predicate: F) -> Vec<SpkiRecord>
    where
        F: FnMut(&SpkiRecord) -> bool,
    {
        let doomed: Vec<Handle> = self
            .handles()
            .filter(|&handle| self.get(handle).map_or(false, &mut predicate))
            .collect();

        doomed
            .into_iter()
            .filter_map(|handle| self.erase(handle))
            .collect()
    }

    fn handles(&self) -> Handles<'_> {
        Handles {
            index: self,
            cursor: self.head,
        }
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SpkiRecord> + '_ {
        self.handles().filter_map(move |handle| self.get(handle))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.buckets.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Verify that list and hash index hold the same records exactly once
    /// and that no two records are exact matches.
    pub fn check_consistency(&self) -> SpkiResult<()> {
        let mut listed = vec![false; self.slots.len()];
        let mut prev = None;
        let mut cursor = self.head;
        let mut count = 0usize;

        while let Some(handle) = cursor {
            let slot = self.slot(handle).ok_or_else(|| {
                SpkiError::Inconsistent(format!("list references empty slot {}", handle.0))
            })?;
            if listed[handle.0] {
                return Err(SpkiError::Inconsistent(format!(
                    "slot {} listed twice",
                    handle.0
                )));
            }
            if slot.prev != prev {
                return Err(SpkiError::Inconsistent(format!(
                    "slot {} has a broken back link",
                    handle.0
                )));
            }
            listed[handle.0] = true;
            count += 1;
            prev = Some(handle);
            cursor = slot.next;
        }

        if self.tail != prev {
            return Err(SpkiError::Inconsistent("tail does not end the list".into()));
        }
        if count != self.len {
            return Err(SpkiError::Inconsistent(format!(
                "list holds {} records, length is {}",
                count, self.len
            )));
        }

        let mut indexed = vec![false; self.slots.len()];
        for (asn, bucket) in &self.buckets {
            if bucket.is_empty() {
                return Err(SpkiError::Inconsistent(format!("empty bucket for AS{}", asn)));
            }
            for (i, &handle) in bucket.iter().enumerate() {
                let record = self.get(handle).ok_or_else(|| {
                    SpkiError::Inconsistent(format!("AS{} bucket references empty slot", asn))
                })?;
                if record.asn != *asn {
                    return Err(SpkiError::Inconsistent(format!(
                        "AS{} record filed under AS{}",
                        record.asn, asn
                    )));
                }
                if !listed[handle.0] || indexed[handle.0] {
                    return Err(SpkiError::Inconsistent(format!(
                        "slot {} indexed without a matching list entry",
                        handle.0
                    )));
                }
                indexed[handle.0] = true;

                let duplicate = bucket[i + 1..].iter().any(|&other| {
                    self.get(other)
                        .map_or(false, |other| exact_match(record, other))
                });
                if duplicate {
                    return Err(SpkiError::Inconsistent(format!(
                        "duplicate router key in AS{} bucket",
                        asn
                    )));
                }
            }
        }

        if listed != indexed {
            return Err(SpkiError::Inconsistent(
                "listed records missing from the hash index".into(),
            ));
        }

        Ok(())
    }
}

/// Walks slot handles along the ordered list
struct Handles<'a> {
    index: &'a DualIndex,
    cursor: Option<Handle>,
}

impl Iterator for Handles<'_> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let handle = self.cursor?;
        self.cursor = self.index.slot(handle).and_then(|slot| slot.next);
        Some(handle)
    }
}
