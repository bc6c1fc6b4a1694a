//! Codec Scenario Tests
//!
//! End-to-end byte layouts and round trips through the public facade:
//! scalar layouts, composite values, the Object envelope and values built
//! from IEC type declarations.

#[path = "../common/mod.rs"]
mod common;

mod composites;
mod object_envelope;
mod scalar_layouts;
mod schema_store;
