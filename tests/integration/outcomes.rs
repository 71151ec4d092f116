//! One test per terminal outcome, driven through the full bridge.

use super::fake_engine::{init_tracing, FakeEngine, Reply};
use std::fs;
use std::sync::Arc;
use tokenizer_bridge::{BridgeOutcome, Error, Resolver, TokenizerBridge};

fn bridge_over(engine: Arc<FakeEngine>, resolver: Resolver) -> TokenizerBridge {
    TokenizerBridge::builder()
        .with_engine(engine)
        .with_resolver(resolver)
        .build()
        .unwrap()
}

#[test]
fn test_hello_world_through_cached_tokenizer() {
    init_tracing();
    let cache = tempfile::tempdir().unwrap();
    let snapshot = cache
        .path()
        .join("huggingface/hub/models--bert-base-uncased/snapshots/abc123");
    fs::create_dir_all(&snapshot).unwrap();
    fs::write(snapshot.join("tokenizer.json"), "{}").unwrap();

    let engine = FakeEngine::replying(
        r#"{"tokens":["hello",",","world","!"],"ids":[7592,1010,2088,999],"debug_logs":["loaded"]}"#,
    )
    .into_arc();
    let bridge = bridge_over(engine.clone(), Resolver::new().with_cache_root(cache.path()));

    let outcome = bridge.tokenize("Hello, world!", None).unwrap();
    match &outcome {
        BridgeOutcome::Success { result, debug_logs } => {
            assert_eq!(result.tokens(), ["hello", ",", "world", "!"]);
            assert_eq!(result.ids(), [7592, 1010, 2088, 999]);
            assert_eq!(debug_logs, &vec!["loaded".to_string()]);
        }
        other => panic!("expected success, got {:?}", other),
    }

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "Hello, world!");
    assert_eq!(
        calls[0].reference,
        snapshot.join("tokenizer.json").to_string_lossy()
    );
}

#[test]
fn test_explicit_hint_is_passed_verbatim() {
    let engine = FakeEngine::replying(r#"{"tokens":["x"],"ids":[1]}"#).into_arc();
    let bridge = bridge_over(engine.clone(), Resolver::new().without_cache());

    bridge.tokenize("x", Some("org/some-model")).unwrap();
    assert_eq!(engine.calls()[0].reference, "org/some-model");
}

#[test]
fn test_empty_cache_falls_back() {
    let cache = tempfile::tempdir().unwrap();
    let engine = FakeEngine::replying(r#"{"tokens":[],"ids":[]}"#).into_arc();
    let bridge = bridge_over(
        engine.clone(),
        Resolver::new()
            .with_cache_root(cache.path())
            .with_fallback_path("/models/tokenizer.json"),
    );

    let outcome = bridge.tokenize("", None).unwrap();
    assert!(outcome.result().unwrap().is_empty());
    assert_eq!(engine.calls()[0].reference, "/models/tokenizer.json");
}

#[test]
fn test_null_response_is_transport_failure() {
    let engine = FakeEngine::null().into_arc();
    let bridge = bridge_over(engine.clone(), Resolver::new().without_cache());

    let outcome = bridge.tokenize("Hello", Some("m")).unwrap();
    assert_eq!(outcome, BridgeOutcome::TransportFailure);
    assert_eq!(engine.freed(), 0);
    assert_eq!(engine.bad_frees(), 0);

    let err = outcome.into_result().unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn test_error_payload_is_semantic_failure() {
    let engine = FakeEngine::replying(r#"{"error":"unauthorized"}"#).into_arc();
    let bridge = bridge_over(engine.clone(), Resolver::new().without_cache());

    let outcome = bridge.tokenize("Hello", Some("m")).unwrap();
    assert_eq!(
        outcome,
        BridgeOutcome::SemanticFailure {
            message: "unauthorized".into(),
            debug_logs: vec![],
        }
    );
    assert_eq!(engine.freed(), 1);
}

#[test]
fn test_semantic_failure_keeps_engine_logs() {
    let engine = FakeEngine::replying(
        r#"{"error":"model not found","debug_logs":["fetching","404"]}"#,
    )
    .into_arc();
    let bridge = bridge_over(engine, Resolver::new().without_cache());

    let err = bridge
        .tokenize("Hello", Some("m"))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(err.debug_logs(), ["fetching", "404"]);
}

#[test]
fn test_garbage_payload_is_protocol_failure() {
    let engine = FakeEngine::new(|_| Reply::Json("not json at all".into())).into_arc();
    let bridge = bridge_over(engine.clone(), Resolver::new().without_cache());

    match bridge.tokenize("Hello", Some("m")).unwrap() {
        BridgeOutcome::ProtocolFailure { raw, .. } => {
            assert_eq!(raw.as_str(), "not json at all");
        }
        other => panic!("expected protocol failure, got {:?}", other),
    }
    assert_eq!(engine.freed(), 1);
}

#[test]
fn test_mismatched_lengths_are_protocol_failure() {
    let engine = FakeEngine::replying(r#"{"tokens":["a","b"],"ids":[1]}"#).into_arc();
    let bridge = bridge_over(engine, Resolver::new().without_cache());

    let outcome = bridge.tokenize("ab", Some("m")).unwrap();
    assert_eq!(outcome.kind(), "protocol_failure");
}

#[test]
fn test_invalid_utf8_is_protocol_failure() {
    let engine = FakeEngine::new(|_| Reply::Bytes(vec![b'{', 0xff, 0xfe, b'}'])).into_arc();
    let bridge = bridge_over(engine.clone(), Resolver::new().without_cache());

    let outcome = bridge.tokenize("x", Some("m")).unwrap();
    assert_eq!(outcome.kind(), "protocol_failure");
    assert_eq!(engine.freed(), 1);
}

#[test]
fn test_nul_in_text_fails_before_the_boundary() {
    let engine = FakeEngine::replying(r#"{"tokens":[],"ids":[]}"#).into_arc();
    let bridge = bridge_over(engine.clone(), Resolver::new().without_cache());

    let err = bridge.tokenize("a\0b", Some("m")).unwrap_err();
    assert!(matches!(err, Error::Encoding { field: "text", .. }));
    assert!(engine.calls().is_empty());
}

#[test]
fn test_build_without_engine_is_configuration_error() {
    let err = TokenizerBridge::builder().build().unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("library_path")
    );
}

#[test]
fn test_missing_library_is_engine_load_error() {
    let err = TokenizerBridge::builder()
        .with_library("/nonexistent/libhf_tokenizer_bridge.so")
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::EngineLoad { .. }));
}
