//! # Boundary Call Adapter
//!
//! Everything that touches raw pointers lives here. The rest of the crate
//! only sees owned Rust values.
//!
//! ## Ownership zones
//!
//! | Zone | Owner | Released by |
//! |------|-------|-------------|
//! | text / reference / credential buffers | caller (`CString`) | scope exit, every path |
//! | response buffer | engine | [`NativeResponse`] drop, exactly once |
//!
//! ## Safety
//!
//! The engine is foreign code. The adapter relies on this contract:
//!
//! 1. Input pointers are only read during the call and never retained.
//! 2. A non-null response is a NUL-terminated buffer that stays valid until
//!    it is passed to `free_response`.
//! 3. `free_response` accepts every non-null pointer the engine returned,
//!    once.
//!
//! Whether the engine tolerates concurrent calls is declared through
//! [`EngineConcurrency`]; the default serializes all calls into the same
//! engine.

mod adapter;
mod buffer;
mod engine;

pub use adapter::{BoundaryAdapter, EngineConcurrency, Invocation};
pub use buffer::NativeResponse;
pub use engine::{DynamicEngine, EngineSymbols, NativeEngine};
