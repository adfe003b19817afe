//! Shared-state behaviour of the rate gate and response cache under
//! concurrent callers

#![allow(clippy::unwrap_used)]

use std::{sync::Arc, thread, time::Duration};

use domain::ErrorKind;
use infrastructure::{RateGate, TtlCache};

#[test]
fn rate_gate_admits_exactly_the_ceiling_across_threads() {
    let gate = Arc::new(RateGate::new(25));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                (0..10)
                    .map(|_| gate.check_and_consume())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 25);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == ErrorKind::RateLimit)
    );
}

#[test]
fn cache_never_exceeds_capacity_under_concurrent_writes() {
    let cache = Arc::new(TtlCache::new(Duration::from_secs(600), 16));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..50 {
                    cache.set(format!("t{t}_{i}"), i);
                    assert!(cache.len() <= 16);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 16);
    assert_eq!(cache.stats().entries, 16);
}
