//! Input helpers.
//!
//! - reference dataset ingest + validation (`ingest`)
//! - model point-series CSV (`model_csv`)

pub mod ingest;
pub mod model_csv;

pub use ingest::*;
pub use model_csv::*;
