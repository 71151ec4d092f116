//! # tokenizer-bridge
//!
//! Safe boundary layer for calling a native tokenization engine through a C ABI.
//!
//! ## Overview
//!
//! Tokenization itself happens inside an opaque native library. This crate
//! owns everything around the call:
//!
//! - **Resolution**: turn a hint (path, model id, or nothing) into a model reference
//! - **Marshaling**: encode inputs as caller-owned NUL-terminated buffers
//! - **Dispatch**: choose the authenticated or standard entry point
//! - **Release**: free every engine-owned response exactly once, on every path
//! - **Decoding**: classify the JSON response as success, semantic, protocol
//!   or transport failure
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tokenizer_bridge::{BridgeOutcome, TokenizerBridge};
//!
//! fn main() -> tokenizer_bridge::Result<()> {
//!     let bridge = TokenizerBridge::builder()
//!         .with_library("lib/libhf_tokenizer_bridge.so")
//!         .build()?;
//!
//!     match bridge.tokenize("Hello, world!", None)? {
//!         BridgeOutcome::Success { result, .. } => {
//!             for (token, id) in result.pairs() {
//!                 println!("{token}\t{id}");
//!             }
//!         }
//!         other => eprintln!("tokenization failed: {:?}", other),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`resolver`] | Model reference resolution with cache and fallback |
//! | [`ffi`] | Native engine ABI, response ownership, boundary adapter |
//! | [`protocol`] | Response wire format and outcome classification |
//! | [`gating`] | Gated-model policy and credential sourcing |
//! | [`bridge`] | Caller-facing [`TokenizerBridge`] and its builder |
//! | [`config`] | [`BridgeConfig`] from defaults, env or file |
//! | [`types`] | Shared data types |

pub mod bridge;
pub mod config;
pub mod ffi;
pub mod gating;
pub mod protocol;
pub mod resolver;
pub mod types;

pub use bridge::{GatedOutcome, TokenizerBridge, TokenizerBridgeBuilder};
pub use config::BridgeConfig;
pub use ffi::{BoundaryAdapter, DynamicEngine, EngineConcurrency, Invocation, NativeEngine};
pub use gating::{CredentialSource, CredentialWarning, GateDecision, GatingPolicy, PatternGating};
pub use protocol::{BridgeOutcome, Tokenized};
pub use resolver::{Resolver, SnapshotOrder};
pub use types::{Credential, DiagnosticLog, ModelReference, RawPayload, TokenizationResult};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
