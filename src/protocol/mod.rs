//! # Response Protocol Module
//!
//! Decodes the JSON payload returned by the native engine into a
//! [`BridgeOutcome`].
//!
//! ## Wire format
//!
//! ```json
//! {"tokens": ["Hello", ","], "ids": [101, 102], "error": "optional", "debug_logs": ["optional"]}
//! ```
//!
//! ## Outcome classification
//!
//! | Payload | Outcome |
//! |---------|---------|
//! | none (null pointer) | [`BridgeOutcome::TransportFailure`] (decided by the adapter) |
//! | not parseable / tokens and ids inconsistent | [`BridgeOutcome::ProtocolFailure`] |
//! | non-empty `error` | [`BridgeOutcome::SemanticFailure`] |
//! | otherwise | [`BridgeOutcome::Success`] |
//!
//! `debug_logs` never influence the classification.

mod decode;
mod outcome;
mod wire;

pub use decode::{decode, decode_str};
pub use outcome::{BridgeOutcome, Tokenized};
pub use wire::ResponseEnvelope;
