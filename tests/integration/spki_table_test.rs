//! Router key table integration tests
//!
//! Exercises the public table API the way the RTR protocol layer and
//! routing policy code use it.

use rtrkeys_spki::{SourceId, SpkiError, SpkiRecord, SpkiTable, SKI_SIZE, SPKI_SIZE};

fn router_key(asn: u32, ski: u8, source: SourceId) -> SpkiRecord {
    let mut spki = [0u8; SPKI_SIZE];
    spki[0] = 0x30;
    spki[1] = ski;
    SpkiRecord::new(asn, [ski; SKI_SIZE], spki, source)
}

fn sorted(mut records: Vec<SpkiRecord>) -> Vec<SpkiRecord> {
    records.sort_by_key(|r| (r.asn, r.ski, r.source));
    records
}

#[test]
fn test_round_trip_single_key() {
    let table = SpkiTable::new();
    let r = router_key(64496, 1, SourceId::next());

    table.add(r.clone()).expect("Failed to add key");
    let found = table.get_all(64496);

    assert_eq!(found.iter().filter(|k| **k == r).count(), 1);
    assert_eq!(found.len(), 1);
}

#[test]
fn test_duplicate_leaves_size_unchanged() {
    let table = SpkiTable::new();
    let r = router_key(64496, 1, SourceId::next());

    table.add(r.clone()).unwrap();
    assert_eq!(table.add(r), Err(SpkiError::Duplicate { asn: 64496 }));
    assert_eq!(table.len(), 1);
    table.check_consistency().unwrap();
}

#[test]
fn test_multi_asn_lookup() {
    let table = SpkiTable::new();
    let source = SourceId::next();
    let r1 = router_key(64512, 0xa, source);
    let r2 = router_key(64512, 0xb, source);
    let r3 = router_key(64513, 0xc, source);

    table.add(r1.clone()).unwrap();
    table.add(r2.clone()).unwrap();
    table.add(r3.clone()).unwrap();

    assert_eq!(sorted(table.get_all(64512)), vec![r1, r2]);
    assert_eq!(table.get_all(64513), vec![r3]);
    assert_eq!(table.get_all(1), Vec::<SpkiRecord>::new());
}

#[test]
fn test_snapshot_is_independent_of_table() {
    let table = SpkiTable::new();
    let source = SourceId::next();
    table.add(router_key(64512, 1, source)).unwrap();

    let mut snapshot = table.get_all(64512);
    table.add(router_key(64512, 2, source)).unwrap();
    snapshot[0].asn = 1;

    assert_eq!(snapshot.len(), 1);
    assert_eq!(table.get_all(64512).len(), 2);
    assert!(table.get_all(1).is_empty());
}

#[test]
fn test_source_purge() {
    let table = SpkiTable::new();
    let s1 = SourceId::next();
    let s2 = SourceId::next();
    table.add(router_key(64512, 1, s1)).unwrap();
    table.add(router_key(64513, 2, s1)).unwrap();
    table.add(router_key(64512, 3, s1)).unwrap();
    let survivor = router_key(64512, 4, s2);
    table.add(survivor.clone()).unwrap();

    assert_eq!(table.remove_by_source(s1), 3);
    assert_eq!(table.records(), vec![survivor.clone()]);
    assert_eq!(table.get_all(64512), vec![survivor]);
    assert!(table.get_all(64513).is_empty());

    // Second purge is a no-op
    assert_eq!(table.remove_by_source(s1), 0);
    assert_eq!(table.len(), 1);
    table.check_consistency().unwrap();
}

#[test]
fn test_removal() {
    let table = SpkiTable::new();
    let source = SourceId::next();
    let r = router_key(64512, 1, source);
    table.add(r.clone()).unwrap();
    table.add(router_key(64512, 2, source)).unwrap();

    table.remove(&r).unwrap();
    assert!(!table.get_all(64512).contains(&r));
    assert!(!table.contains(&r));

    let before = table.records();
    assert_eq!(table.remove(&r), Err(SpkiError::NotFound { asn: 64512 }));
    assert_eq!(table.records(), before);
}

#[test]
fn test_readd_after_remove_goes_to_end() {
    let table = SpkiTable::new();
    let source = SourceId::next();
    let a = router_key(1, 1, source);
    let b = router_key(2, 2, source);
    table.add(a.clone()).unwrap();
    table.add(b.clone()).unwrap();

    table.remove(&a).unwrap();
    table.add(a.clone()).unwrap();

    assert_eq!(table.records(), vec![b, a]);
    table.check_consistency().unwrap();
}

#[test]
fn test_uniqueness_holds_after_many_adds() {
    let table = SpkiTable::new();
    let sources = [SourceId::next(), SourceId::next()];
    for round in 0..3 {
        for asn in 0..10u32 {
            for ski in 0..5u8 {
                let _ = table.add(router_key(asn, ski, sources[(round + ski as usize) % 2]));
            }
        }
    }

    let records = table.records();
    assert_eq!(records.len(), 50);
    for (i, a) in records.iter().enumerate() {
        for b in &records[i + 1..] {
            assert!(a.asn != b.asn || a.ski != b.ski || a.spki != b.spki);
        }
    }
    table.check_consistency().unwrap();
}

#[test]
fn test_records_serialize_for_export() {
    let table = SpkiTable::new();
    table.add(router_key(64512, 1, SourceId::new(42))).unwrap();

    let json = serde_json::to_value(table.records()).unwrap();
    assert_eq!(json[0]["asn"], 64512);
    assert_eq!(json[0]["source"], 42);
    assert_eq!(json[0]["ski"].as_str().unwrap().len(), SKI_SIZE * 2);
}
