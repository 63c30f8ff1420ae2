//! Concurrency and load tests for the router key table
//!
//! The correctness tests run by default. The throughput test is ignored:
//! cargo test --test load_test --release -- --ignored

use rtrkeys_spki::{SourceId, SpkiRecord, SpkiTable, SKI_SIZE, SPKI_SIZE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Number of writer threads, one per simulated cache connection
const WRITERS: usize = 8;

/// Keys each writer announces
const KEYS_PER_WRITER: usize = 500;

/// Distinct keys per writer, spread over a small ASN range so buckets are shared
fn writer_key(writer: usize, i: usize, source: SourceId) -> SpkiRecord {
    let mut ski = [0u8; SKI_SIZE];
    ski[..8].copy_from_slice(&(writer as u64).to_be_bytes());
    ski[8..16].copy_from_slice(&(i as u64).to_be_bytes());
    let mut spki = [0u8; SPKI_SIZE];
    spki[..SKI_SIZE].copy_from_slice(&ski);
    SpkiRecord::new(64512 + (i % 16) as u32, ski, spki, source)
}

#[test]
fn test_concurrent_disjoint_adds() {
    let table = Arc::new(SpkiTable::new());
    let sources: Vec<SourceId> = (0..WRITERS).map(|_| SourceId::next()).collect();

    thread::scope(|scope| {
        for (writer, &source) in sources.iter().enumerate() {
            let table = Arc::clone(&table);
            scope.spawn(move || {
                for i in 0..KEYS_PER_WRITER {
                    table
                        .add(writer_key(writer, i, source))
                        .expect("disjoint keys never collide");
                }
            });
        }
    });

    assert_eq!(table.len(), WRITERS * KEYS_PER_WRITER);
    table.check_consistency().expect("index and list diverged");

    for (writer, &source) in sources.iter().enumerate() {
        assert_eq!(table.records_from_source(source).len(), KEYS_PER_WRITER);
        for i in (0..KEYS_PER_WRITER).step_by(97) {
            assert!(table.contains(&writer_key(writer, i, source)));
        }
    }
}

#[test]
fn test_concurrent_purge_and_readers() {
    let table = Arc::new(SpkiTable::new());
    let sources: Vec<SourceId> = (0..WRITERS).map(|_| SourceId::next()).collect();
    for (writer, &source) in sources.iter().enumerate() {
        for i in 0..KEYS_PER_WRITER {
            table.add(writer_key(writer, i, source)).unwrap();
        }
    }

    let done = Arc::new(AtomicBool::new(false));
    thread::scope(|scope| {
        // Policy readers: every snapshot is internally duplicate-free
        for _ in 0..4 {
            let table = Arc::clone(&table);
            let done = Arc::clone(&done);
            scope.spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    for asn in 64512..64528 {
                        let keys = table.get_all(asn);
                        assert!(keys.iter().all(|k| k.asn == asn));
                        let mut skis: Vec<_> = keys.iter().map(|k| k.ski).collect();
                        skis.sort_unstable();
                        skis.dedup();
                        assert_eq!(skis.len(), keys.len());
                    }
                }
            });
        }

        // Even writers disconnect while odd writers keep announcing and withdrawing
        let mut writers = Vec::new();
        for (writer, &source) in sources.iter().enumerate() {
            let table = Arc::clone(&table);
            writers.push(scope.spawn(move || {
                if writer % 2 == 0 {
                    assert_eq!(table.remove_by_source(source), KEYS_PER_WRITER);
                } else {
                    for i in 0..KEYS_PER_WRITER {
                        let key = writer_key(writer, i, source);
                        table.remove(&key).unwrap();
                        table.add(key).unwrap();
                    }
                }
            }));
        }
        for handle in writers {
            handle.join().expect("writer panicked");
        }
        done.store(true, Ordering::Relaxed);
    });

    assert_eq!(table.len(), (WRITERS / 2) * KEYS_PER_WRITER);
    for (writer, &source) in sources.iter().enumerate() {
        let expected = if writer % 2 == 0 { 0 } else { KEYS_PER_WRITER };
        assert_eq!(table.records_from_source(source).len(), expected);
    }
    table.check_consistency().unwrap();
}

#[test]
fn test_racing_duplicate_adds_store_once() {
    let table = Arc::new(SpkiTable::new());
    let key = writer_key(0, 0, SourceId::next());

    let accepted: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|_| {
                let table = Arc::clone(&table);
                let key = key.clone();
                scope.spawn(move || usize::from(table.add(key).is_ok()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(accepted, 1);
    assert_eq!(table.len(), 1);
}

#[test]
#[ignore] // Throughput measurement, run manually in release mode
fn test_table_throughput() {
    let table = Arc::new(SpkiTable::with_capacity(WRITERS * 20_000).unwrap());
    let start = Instant::now();

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let table = Arc::clone(&table);
            scope.spawn(move || {
                let source = SourceId::next();
                for i in 0..20_000 {
                    let mut key = writer_key(writer, i, source);
                    key.asn = i as u32;
                    table.add(key).unwrap();
                    let _ = table.get_all(i as u32);
                }
            });
        }
    });

    let elapsed = start.elapsed();
    let ops = WRITERS * 20_000 * 2;
    println!(
        "{} operations in {:?} ({:.0} ops/sec)",
        ops,
        elapsed,
        ops as f64 / elapsed.as_secs_f64()
    );
    table.check_consistency().unwrap();
}
