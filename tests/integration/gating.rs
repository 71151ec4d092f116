//! Gated-model preflight and entry point selection.

use super::fake_engine::{init_tracing, EntryPoint, FakeEngine};
use tokenizer_bridge::{
    BridgeOutcome, Credential, CredentialSource, ModelReference, PatternGating, Resolver,
    TokenizerBridge,
};

const GATED: &str = "meta-llama/Llama-3.2-1B";

fn gated_bridge(engine: std::sync::Arc<FakeEngine>, env_var: &str) -> TokenizerBridge {
    TokenizerBridge::builder()
        .with_engine(engine)
        .with_resolver(Resolver::new().without_cache())
        .with_gating(PatternGating::new(["^meta-llama/"]).unwrap())
        .with_credential_source(CredentialSource::from_env(env_var))
        .build()
        .unwrap()
}

#[test]
fn test_gated_without_credential_warns_and_calls_unauthenticated() {
    init_tracing();
    let env_var = "TOKENIZER_BRIDGE_IT_TOKEN_MISSING";
    std::env::remove_var(env_var);

    let engine = FakeEngine::replying(r#"{"error":"unauthorized"}"#).into_arc();
    let bridge = gated_bridge(engine.clone(), env_var);

    let gated = bridge.tokenize_gated("Hello", Some(GATED)).unwrap();
    let warning = gated.warning.expect("missing credential should warn");
    assert_eq!(warning.reference.as_str(), GATED);
    assert_eq!(warning.env_var, env_var);
    assert!(warning.to_string().contains(env_var));

    assert_eq!(
        gated.outcome,
        BridgeOutcome::SemanticFailure {
            message: "unauthorized".into(),
            debug_logs: vec![],
        }
    );

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].entry, EntryPoint::Tokenize);
    assert_eq!(calls[0].credential, None);
}

#[test]
fn test_gated_with_credential_uses_authenticated_entry_point() {
    let env_var = "TOKENIZER_BRIDGE_IT_TOKEN_PRESENT";
    std::env::set_var(env_var, "hf_integration");

    let engine = FakeEngine::replying(r#"{"tokens":["<|begin_of_text|>","Hello"],"ids":[128000,9906]}"#)
        .into_arc();
    let bridge = gated_bridge(engine.clone(), env_var);

    let gated = bridge.tokenize_gated("Hello", Some(GATED)).unwrap();
    assert!(gated.warning.is_none());
    assert!(gated.outcome.is_success());

    let calls = engine.calls();
    assert_eq!(calls[0].entry, EntryPoint::TokenizeWithCredential);
    assert_eq!(calls[0].credential.as_deref(), Some("hf_integration"));
    assert_eq!(engine.freed(), 1);
}

#[test]
fn test_ungated_reference_never_reads_credential() {
    let env_var = "TOKENIZER_BRIDGE_IT_TOKEN_UNUSED";
    std::env::set_var(env_var, "hf_unused");

    let engine = FakeEngine::replying(r#"{"tokens":["hi"],"ids":[1]}"#).into_arc();
    let bridge = gated_bridge(engine.clone(), env_var);

    let gated = bridge.tokenize_gated("hi", Some("bert-base-uncased")).unwrap();
    assert!(gated.warning.is_none());
    assert_eq!(engine.calls()[0].entry, EntryPoint::Tokenize);
}

#[test]
fn test_explicit_credential_bypasses_policy() {
    let engine = FakeEngine::replying(r#"{"tokens":["hi"],"ids":[1]}"#).into_arc();
    let bridge = TokenizerBridge::builder()
        .with_engine(engine.clone())
        .with_resolver(Resolver::new().without_cache())
        .build()
        .unwrap();

    let credential = Credential::new("hf_explicit").unwrap();
    bridge
        .tokenize_with_credential("hi", Some("any/model"), &credential)
        .unwrap();

    let call = &engine.calls()[0];
    assert_eq!(call.entry, EntryPoint::TokenizeWithCredential);
    assert_eq!(call.credential.as_deref(), Some("hf_explicit"));
}

#[test]
fn test_closure_policy() {
    let env_var = "TOKENIZER_BRIDGE_IT_TOKEN_CLOSURE";
    std::env::remove_var(env_var);

    let engine = FakeEngine::replying(r#"{"tokens":[],"ids":[]}"#).into_arc();
    let bridge = TokenizerBridge::builder()
        .with_engine(engine)
        .with_resolver(Resolver::new().without_cache())
        .with_gating(|r: &ModelReference| r.as_str().starts_with("private/"))
        .with_credential_source(CredentialSource::from_env(env_var))
        .build()
        .unwrap();

    let decision = bridge.preflight(&ModelReference::new("private/model"));
    assert!(decision.warning().is_some());
    let decision = bridge.preflight(&ModelReference::new("public/model"));
    assert!(decision.warning().is_none() && decision.credential().is_none());
}
