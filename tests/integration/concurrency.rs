//! Serialization of calls into a shared engine.

use super::fake_engine::FakeEngine;
use std::thread;
use std::time::Duration;
use tokenizer_bridge::{BoundaryAdapter, EngineConcurrency, ModelReference};

const BODY: &str = r#"{"tokens":["t"],"ids":[1]}"#;

fn hammer(adapters: Vec<BoundaryAdapter>) {
    let handles: Vec<_> = adapters
        .into_iter()
        .flat_map(|adapter| {
            (0..4).map(move |i| {
                let adapter = adapter.clone();
                thread::spawn(move || {
                    adapter
                        .invoke(&format!("call {}", i), &ModelReference::new("m"), None)
                        .unwrap()
                })
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_serialized_adapter_never_overlaps() {
    let engine = FakeEngine::replying(BODY)
        .with_delay(Duration::from_millis(10))
        .into_arc();
    hammer(vec![BoundaryAdapter::new(engine.clone())]);

    assert_eq!(engine.calls().len(), 4);
    assert_eq!(engine.max_active(), 1);
    assert_eq!(engine.freed(), 4);
}

#[test]
fn test_same_identity_shares_lock_across_adapters() {
    let first = FakeEngine::replying(BODY).with_delay(Duration::from_millis(10));
    let second = FakeEngine::replying(BODY)
        .with_delay(Duration::from_millis(10))
        .sharing_with(&first);
    let (first, second) = (first.into_arc(), second.into_arc());

    hammer(vec![
        BoundaryAdapter::new(first.clone()),
        BoundaryAdapter::new(second.clone()),
    ]);
    assert_eq!(first.max_active(), 1);
    assert_eq!(first.freed() + second.freed(), 8);
}

#[test]
fn test_concurrent_adapter_allows_overlap() {
    let engine = FakeEngine::replying(BODY)
        .with_delay(Duration::from_millis(50))
        .into_arc();
    let adapter = BoundaryAdapter::with_concurrency(engine.clone(), EngineConcurrency::Concurrent);
    hammer(vec![adapter]);

    assert_eq!(engine.freed(), 4);
    assert!(engine.max_active() > 1, "calls never overlapped");
}
