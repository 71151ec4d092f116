//! # Types Module
//!
//! Core data types shared by the resolver, the boundary adapter and the
//! response decoder.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ModelReference`] | Resolved tokenizer artifact identifier (path or model id) |
//! | [`Credential`] | Optional authentication token, redacted in all output |
//! | [`RawPayload`] | Caller-owned copy of the engine's response text |
//! | [`TokenizationResult`] | Paired tokens and ids |
//! | [`DiagnosticLog`] | Informational lines reported by the engine |

pub mod credential;
pub mod reference;
pub mod result;

pub use credential::Credential;
pub use reference::ModelReference;
pub use result::{DiagnosticLog, RawPayload, TokenizationResult};
