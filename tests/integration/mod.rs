//! Integration tests against a scripted in-process engine

pub mod outcomes;
pub mod gating;
pub mod resource_release;
pub mod concurrency;
