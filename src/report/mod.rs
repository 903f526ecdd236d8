//! Reporting utilities: terminal summaries and JSON output of metric reports.

pub mod format;

pub use format::*;

use crate::domain::MetricReport;
use crate::error::AppError;

/// Pretty-printed JSON of the full report.
pub fn report_json(report: &MetricReport) -> Result<String, AppError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| AppError::new(4, format!("Failed to serialize report: {e}")))
}
