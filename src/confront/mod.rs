//! Confrontation orchestration.
//!
//! Responsibilities:
//!
//! - request and narrow the model series (engine)
//! - check model/observation time alignment (align)
//! - reduce vertical profiles to a near-surface series (profile)
//! - assemble the metric report (engine)

pub mod align;
pub mod engine;
pub mod profile;

pub use align::*;
pub use engine::*;
pub use profile::*;
