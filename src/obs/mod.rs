//! Observation-side access: the reference record behind a windowed,
//! unit-aware view.

pub mod store;

pub use store::*;
