//! Numerical building blocks: calendar, monthly weights, weighted estimators,
//! and annual amplitude statistics.

pub mod annual;
pub mod calendar;
pub mod stats;
pub mod weights;

pub use annual::*;
pub use stats::*;
pub use weights::*;
