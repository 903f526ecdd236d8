//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - masked series (`TimeSeries`, `ModelValues`, `ExtractedSeries`)
//! - the reference dataset (`ObservationRecord`, `Site`)
//! - confrontation outputs (`MetricReport`, `Metrics`, `AnnualAmplitude`)
//! - run configuration (`ConfrontSettings`, `RunConfig`, `DemoConfig`)

pub mod types;

pub use types::*;
