//! RTR session lifecycle tests
//!
//! Simulates two cache connections feeding Router Key PDUs into one shared
//! table, then resets and disconnects.

use parking_lot::Mutex;
use rtrkeys_spki::{
    apply_router_key, SourceId, SpkiEvent, SpkiRecord, SpkiStore, SpkiTable, SKI_SIZE, SPKI_SIZE,
};
use std::sync::Arc;

/// A Router Key PDU as the protocol layer would hand it over
struct RouterKeyPdu {
    withdraw: bool,
    asn: u32,
    ski: u8,
}

fn to_record(pdu: &RouterKeyPdu, source: SourceId) -> SpkiRecord {
    SpkiRecord::from_slices(pdu.asn, &[pdu.ski; SKI_SIZE], &[pdu.ski; SPKI_SIZE], source)
        .expect("fixed-size test key")
}

fn feed(store: &dyn SpkiStore, source: SourceId, pdus: &[RouterKeyPdu]) {
    for pdu in pdus {
        apply_router_key(store, to_record(pdu, source), pdu.withdraw)
            .expect("Failed to apply router key PDU");
    }
}

fn announce(asn: u32, ski: u8) -> RouterKeyPdu {
    RouterKeyPdu {
        withdraw: false,
        asn,
        ski,
    }
}

fn withdraw(asn: u32, ski: u8) -> RouterKeyPdu {
    RouterKeyPdu {
        withdraw: true,
        asn,
        ski,
    }
}

#[test]
fn test_two_caches_then_disconnect() {
    let table = Arc::new(SpkiTable::new());
    let cache_a = SourceId::next();
    let cache_b = SourceId::next();

    feed(
        &*table,
        cache_a,
        &[announce(64500, 1), announce(64500, 2), announce(64501, 3)],
    );
    feed(&*table, cache_b, &[announce(64500, 9), announce(64500, 1)]);

    // Key 1 from cache B duplicates cache A's announcement
    assert_eq!(table.get_all(64500).len(), 3);
    assert_eq!(table.records_from_source(cache_b).len(), 1);

    feed(&*table, cache_a, &[withdraw(64500, 2)]);
    assert_eq!(table.get_all(64500).len(), 2);

    // Cache A goes away
    assert_eq!(table.remove_by_source(cache_a), 2);
    let left: Vec<u8> = table.records().iter().map(|r| r.ski[0]).collect();
    assert_eq!(left, vec![9]);
    table.check_consistency().unwrap();
}

#[test]
fn test_cache_reset_swaps_in_fresh_table() {
    let table = SpkiTable::new();
    let old_session = SourceId::next();
    let other_cache = SourceId::next();
    feed(&table, old_session, &[announce(1, 1), announce(2, 2)]);
    feed(&table, other_cache, &[announce(3, 3)]);

    let fresh = table.copy_except_source(old_session).unwrap();
    let new_session = SourceId::next();
    feed(&fresh, new_session, &[announce(1, 1), announce(4, 4)]);

    assert_eq!(fresh.len(), 3);
    assert!(fresh.records_from_source(old_session).is_empty());
    assert_eq!(fresh.records_from_source(new_session).len(), 2);
    assert_eq!(table.len(), 3);
    fresh.check_consistency().unwrap();
}

#[test]
fn test_observer_event_stream() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let table = SpkiTable::new().with_observer(Arc::new(move |event: &SpkiEvent| {
        sink.lock().push(serde_json::to_value(event).unwrap());
    }));
    let cache = SourceId::new(77);

    feed(&table, cache, &[announce(10, 1), announce(10, 1), withdraw(10, 1)]);
    feed(&table, cache, &[announce(11, 2)]);
    table.remove_by_source(cache);

    let events = events.lock();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| e["event"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["added", "removed", "added", "source_purged"]);
    assert_eq!(events[3]["source"], 77);
    assert_eq!(events[3]["removed"], 1);
    assert_eq!(events[0]["asn"], 10);
}

#[test]
fn test_search_by_ski_for_signature_validation() {
    let table = SpkiTable::new();
    let cache = SourceId::next();
    feed(&table, cache, &[announce(100, 5), announce(200, 5), announce(300, 6)]);

    let mut asns: Vec<u32> = table
        .search_by_ski(&[5; SKI_SIZE])
        .into_iter()
        .map(|r| r.asn)
        .collect();
    asns.sort_unstable();
    assert_eq!(asns, vec![100, 200]);
}
