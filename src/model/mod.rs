//! Model-side collaborator: extracting a point time series from model output.
//!
//! The engine only depends on `ModelSource`; `InMemoryModel` is the concrete
//! source behind the CLI (CSV files) and the synthetic demo.

pub mod memory;

pub use memory::*;

use crate::domain::{ExtractedSeries, Site};
use crate::error::Result;

/// What the engine asks a model for.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRequest {
    pub variable: String,
    pub site: Site,
    pub start: f64,
    pub end: f64,
    /// Tried in order when `variable` is not available.
    pub alternates: Vec<String>,
    pub output_unit: String,
}

impl PointRequest {
    /// Primary name followed by the alternates.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.variable.as_str()).chain(self.alternates.iter().map(String::as_str))
    }
}

/// A model result that can be sampled at a site.
///
/// Implementations resolve variable-name fallbacks and return values already
/// converted to `output_unit`, restricted to `start <= t <= end`.
pub trait ModelSource {
    fn extract_point_time_series(&self, request: &PointRequest) -> Result<ExtractedSeries>;
}
