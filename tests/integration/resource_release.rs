//! Every engine-owned buffer is released exactly once, on every path.

use super::fake_engine::{FakeEngine, Reply};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokenizer_bridge::{Error, Resolver, TokenizerBridge};

fn bridge_over(engine: Arc<FakeEngine>, timeout: Duration) -> TokenizerBridge {
    TokenizerBridge::builder()
        .with_engine(engine)
        .with_resolver(Resolver::new().without_cache())
        .with_timeout(timeout)
        .build()
        .unwrap()
}

#[test]
fn test_each_outcome_frees_once() {
    let bodies = [
        r#"{"tokens":["a"],"ids":[1]}"#,
        r#"{"error":"boom"}"#,
        r#"{"tokens":["a"]}"#,
        "][",
        "",
    ];
    let engine = FakeEngine::new({
        let bodies: Vec<String> = bodies.iter().map(|s| s.to_string()).collect();
        move |call| {
            let idx: usize = call.text.parse().unwrap();
            Reply::Json(bodies[idx].clone())
        }
    })
    .into_arc();
    let bridge = bridge_over(engine.clone(), Duration::from_secs(5));

    let kinds: Vec<&str> = (0..bodies.len())
        .map(|i| bridge.tokenize(&i.to_string(), Some("m")).unwrap().kind())
        .collect();
    assert_eq!(
        kinds,
        [
            "success",
            "semantic_failure",
            "protocol_failure",
            "protocol_failure",
            "protocol_failure"
        ]
    );

    assert_eq!(engine.allocated(), bodies.len());
    assert_eq!(engine.freed(), bodies.len());
    assert_eq!(engine.outstanding(), 0);
    assert_eq!(engine.bad_frees(), 0);
}

#[test]
fn test_null_is_never_freed() {
    let engine = FakeEngine::null().into_arc();
    let bridge = bridge_over(engine.clone(), Duration::from_secs(5));
    for _ in 0..3 {
        bridge.tokenize("x", Some("m")).unwrap();
    }
    assert_eq!(engine.allocated(), 0);
    assert_eq!(engine.freed(), 0);
    assert_eq!(engine.bad_frees(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timeout_still_releases_buffer() {
    let engine = FakeEngine::replying(r#"{"tokens":["slow"],"ids":[1]}"#)
        .with_delay(Duration::from_millis(300))
        .into_arc();
    let bridge = bridge_over(engine.clone(), Duration::from_millis(50));

    let err = bridge.tokenize_async("slow", Some("m")).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { after_ms: 50 }));

    let deadline = Instant::now() + Duration::from_secs(5);
    while engine.freed() == 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(engine.allocated(), 1);
    assert_eq!(engine.freed(), 1);
    assert_eq!(engine.bad_frees(), 0);
}

#[tokio::test]
async fn test_async_within_timeout_succeeds() {
    let engine = FakeEngine::replying(r#"{"tokens":["fast"],"ids":[2]}"#).into_arc();
    let bridge = bridge_over(engine.clone(), Duration::from_secs(5));

    let tokenized = bridge
        .tokenize_async("fast", Some("m"))
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(tokenized.result.ids(), [2]);
    assert_eq!(engine.freed(), 1);
}
